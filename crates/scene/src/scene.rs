//! The scene arena: entity tree, attached components, the pending structural
//! queues and the cached ordered lists the passes iterate.
//!
//! # Invariants
//! - Only the passes touch `updatable` / `renderable`; tree edits only
//!   enqueue onto `entities_to_add` / `entities_to_remove`.
//! - A component is in a cached list iff its slot is `mounted`, and at most
//!   once per list.
//! - `parent` links never form a cycle.

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;

use scenic_common::{ComponentId, EntityId};

use crate::component::{Capabilities, Component, ComponentSlot, downcast_mut, downcast_ref};
use crate::entity::{Entity, EntityNode};
use crate::error::SceneError;
use crate::ordered::OrderedList;

/// Root of an entity tree and owner of all scheduling state.
pub struct Scene {
    root: EntityId,
    entities: BTreeMap<EntityId, EntityNode>,
    components: BTreeMap<ComponentId, ComponentSlot>,
    pub(crate) updatable: OrderedList<ComponentId>,
    pub(crate) renderable: OrderedList<ComponentId>,
    pub(crate) entities_to_add: Vec<EntityId>,
    pub(crate) entities_to_remove: Vec<EntityId>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(std::iter::empty(), std::iter::empty())
    }
}

impl Scene {
    /// Create a scene whose root carries `components` and whose initial
    /// children are instantiated from `children`. Everything is mounted by
    /// the first [`update`](Scene::update).
    pub fn new(
        components: impl IntoIterator<Item = Box<dyn Component>>,
        children: impl IntoIterator<Item = Entity>,
    ) -> Self {
        let root = EntityId::new();
        let mut scene = Self {
            root,
            entities: BTreeMap::new(),
            components: BTreeMap::new(),
            updatable: OrderedList::new(),
            renderable: OrderedList::new(),
            entities_to_add: Vec::new(),
            entities_to_remove: Vec::new(),
        };
        scene
            .entities
            .insert(root, EntityNode::new("Scene".into(), true));
        for component in components {
            scene.attach_component(root, component);
        }
        for child in children {
            let id = scene.spawn(child);
            scene.link(root, id);
        }
        scene.entities_to_add.push(root);
        scene
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    // --- Construction ---

    /// Instantiate a blueprint as a detached subtree. Nothing is queued for
    /// mounting until the subtree is added under a scene-rooted entity.
    pub fn spawn(&mut self, blueprint: Entity) -> EntityId {
        let Entity {
            name,
            enabled,
            components,
            children,
        } = blueprint;
        let id = EntityId::new();
        tracing::trace!(entity = %id.short(), name = %name, "spawn");
        self.entities.insert(id, EntityNode::new(name, enabled));
        for component in components {
            self.attach_component(id, component);
        }
        for child in children {
            let child_id = self.spawn(child);
            self.link(id, child_id);
        }
        id
    }

    /// Spawn `blueprint` and add it under `parent`.
    pub fn attach(&mut self, parent: EntityId, blueprint: Entity) -> EntityId {
        let id = self.spawn(blueprint);
        self.add_child(parent, &[id]);
        id
    }

    /// Append a component to an entity's component list. Does not mount it.
    pub(crate) fn attach_component(
        &mut self,
        entity: EntityId,
        behavior: Box<dyn Component>,
    ) -> Option<ComponentId> {
        let node = self.entities.get_mut(&entity)?;
        let id = ComponentId::new();
        node.components.push(id);
        self.components
            .insert(id, ComponentSlot::new(behavior, entity));
        Some(id)
    }

    fn link(&mut self, parent: EntityId, child: EntityId) {
        if let Some(node) = self.entities.get_mut(&parent) {
            node.children.push(child);
        }
        if let Some(node) = self.entities.get_mut(&child) {
            node.parent = Some(parent);
        }
    }

    // --- Tree edits ---

    /// Append each entity that is not already a direct child of `parent`.
    ///
    /// When `parent` is reachable from the root the child is queued for
    /// mounting on the next update. An entity already under another parent
    /// is not detached from it first.
    pub fn add_child(&mut self, parent: EntityId, children: &[EntityId]) {
        if !self.entities.contains_key(&parent) {
            tracing::warn!(parent = %parent.short(), "add_child on unknown parent ignored");
            return;
        }
        let rooted = self.is_in_scene(parent);
        for &child in children {
            if !self.entities.contains_key(&child) {
                tracing::warn!(child = %child.short(), "add_child with unknown entity ignored");
                continue;
            }
            if child == self.root || self.is_ancestor_or_self(child, parent) {
                tracing::warn!(
                    parent = %parent.short(),
                    child = %child.short(),
                    "add_child would create a cycle; ignored"
                );
                continue;
            }
            if self.entities[&parent].children.contains(&child) {
                continue;
            }
            self.link(parent, child);
            if rooted {
                tracing::trace!(entity = %child.short(), "queued for mount");
                self.entities_to_add.push(child);
            }
        }
    }

    /// Remove each entity that is currently a direct child of `parent`.
    ///
    /// For scene-rooted parents the child keeps its `parent` link until the
    /// next update unmounts it. Detached parents differ: they clear the
    /// child's `parent` link immediately, since nothing below them is mounted
    /// and no update would ever drain a queued removal for them.
    pub fn remove_child(&mut self, parent: EntityId, children: &[EntityId]) {
        if !self.entities.contains_key(&parent) {
            tracing::warn!(parent = %parent.short(), "remove_child on unknown parent ignored");
            return;
        }
        let rooted = self.is_in_scene(parent);
        for &child in children {
            let Some(node) = self.entities.get_mut(&parent) else {
                return;
            };
            let Some(index) = node.children.iter().position(|c| *c == child) else {
                continue;
            };
            node.children.remove(index);
            if rooted {
                tracing::trace!(entity = %child.short(), "queued for unmount");
                self.entities_to_remove.push(child);
            } else if let Some(child_node) = self.entities.get_mut(&child) {
                if child_node.parent == Some(parent) {
                    child_node.parent = None;
                }
            }
        }
    }

    /// Free a detached, fully unmounted subtree.
    pub fn despawn(&mut self, entity: EntityId) -> Result<(), SceneError> {
        if entity == self.root {
            return Err(SceneError::RootEntity);
        }
        let node = self
            .entities
            .get(&entity)
            .ok_or(SceneError::EntityNotFound(entity))?;
        if let Some(parent) = node.parent {
            return Err(SceneError::StillAttached { entity, parent });
        }
        let members: BTreeSet<EntityId> = self.subtree(entity).into_iter().collect();
        let mounted = members
            .iter()
            .flat_map(|id| self.components(*id))
            .any(|c| self.is_mounted(*c));
        if mounted {
            return Err(SceneError::StillMounted(entity));
        }

        for id in &members {
            if let Some(node) = self.entities.remove(id) {
                for component in node.components {
                    self.components.remove(&component);
                }
            }
        }
        for node in self.entities.values_mut() {
            node.children.retain(|c| !members.contains(c));
        }
        self.entities_to_add.retain(|e| !members.contains(e));
        self.entities_to_remove.retain(|e| !members.contains(e));
        tracing::debug!(entity = %entity.short(), count = members.len(), "despawned subtree");
        Ok(())
    }

    // --- Entity queries ---

    pub fn name(&self, entity: EntityId) -> Option<&str> {
        self.entities.get(&entity).map(|n| n.name.as_str())
    }

    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.entities.get(&entity).and_then(|n| n.parent)
    }

    pub fn children(&self, entity: EntityId) -> &[EntityId] {
        self.entities
            .get(&entity)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Components of `entity` in attachment order.
    pub fn components(&self, entity: EntityId) -> &[ComponentId] {
        self.entities
            .get(&entity)
            .map(|n| n.components.as_slice())
            .unwrap_or_default()
    }

    pub fn contains_entity(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Walk the parent chain; `Some(root)` when it reaches this scene's root.
    pub fn scene_root_of(&self, entity: EntityId) -> Option<EntityId> {
        let mut current = entity;
        loop {
            if current == self.root {
                return Some(self.root);
            }
            current = self.entities.get(&current)?.parent?;
        }
    }

    pub fn is_in_scene(&self, entity: EntityId) -> bool {
        self.scene_root_of(entity).is_some()
    }

    fn is_ancestor_or_self(&self, candidate: EntityId, entity: EntityId) -> bool {
        let mut current = Some(entity);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.entities.get(&id).and_then(|n| n.parent);
        }
        false
    }

    pub fn is_entity_enabled(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|n| n.enabled)
    }

    /// False if this entity or any ancestor is disabled.
    pub fn is_enabled_in_hierarchy(&self, entity: EntityId) -> bool {
        let mut current = Some(entity);
        while let Some(id) = current {
            let Some(node) = self.entities.get(&id) else {
                return false;
            };
            if !node.enabled {
                return false;
            }
            current = node.parent;
        }
        true
    }

    pub fn set_entity_enabled(&mut self, entity: EntityId, enabled: bool) {
        match self.entities.get_mut(&entity) {
            Some(node) => node.enabled = enabled,
            None => tracing::warn!(entity = %entity.short(), "set_entity_enabled on unknown entity"),
        }
    }

    /// Entity plus all descendants, parents before children, siblings in
    /// insertion order.
    pub fn subtree(&self, entity: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut visited = BTreeSet::new();
        let mut stack = vec![entity];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.entities.get(&id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Components of every subtree member, in subtree then attachment order.
    pub fn subtree_components(&self, entity: EntityId) -> Vec<ComponentId> {
        self.subtree(entity)
            .into_iter()
            .flat_map(|id| self.components(id).iter().copied())
            .collect()
    }

    /// First entity named `name` in the mounted-or-pending tree below the root.
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.subtree(self.root)
            .into_iter()
            .find(|id| self.name(*id) == Some(name))
    }

    // --- Component queries ---

    /// First component on `entity` whose concrete type is exactly `T`.
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<ComponentId> {
        self.components(entity)
            .iter()
            .copied()
            .find(|id| self.is_type::<T>(*id))
    }

    /// All components on `entity` whose concrete type is exactly `T`.
    pub fn get_components<T: Component>(&self, entity: EntityId) -> Vec<ComponentId> {
        self.components(entity)
            .iter()
            .copied()
            .filter(|id| self.is_type::<T>(*id))
            .collect()
    }

    fn is_type<T: Component>(&self, component: ComponentId) -> bool {
        self.components
            .get(&component)
            .is_some_and(|slot| slot.type_id == TypeId::of::<T>())
    }

    /// Borrow a component as its concrete type. `None` while one of its own
    /// hooks is running.
    pub fn component<T: Component>(&self, component: ComponentId) -> Option<&T> {
        self.components
            .get(&component)?
            .behavior
            .as_deref()
            .and_then(|b| downcast_ref::<T>(b))
    }

    pub fn component_mut<T: Component>(&mut self, component: ComponentId) -> Option<&mut T> {
        self.components
            .get_mut(&component)?
            .behavior
            .as_deref_mut()
            .and_then(|b| downcast_mut::<T>(b))
    }

    pub fn entity_of(&self, component: ComponentId) -> Option<EntityId> {
        self.components.get(&component).map(|s| s.entity)
    }

    pub fn component_type_name(&self, component: ComponentId) -> Option<&'static str> {
        self.components.get(&component).map(|s| s.type_name)
    }

    pub fn capabilities(&self, component: ComponentId) -> Capabilities {
        self.components
            .get(&component)
            .map_or(Capabilities::NONE, |s| s.capabilities)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn is_mounted(&self, component: ComponentId) -> bool {
        self.components.get(&component).is_some_and(|s| s.mounted)
    }

    pub fn is_component_enabled(&self, component: ComponentId) -> bool {
        self.components.get(&component).is_some_and(|s| s.enabled)
    }

    pub fn set_component_enabled(&mut self, component: ComponentId, enabled: bool) {
        match self.components.get_mut(&component) {
            Some(slot) => slot.enabled = enabled,
            None => tracing::warn!(component = %component.short(), "set_component_enabled on unknown component"),
        }
    }

    /// Enabled itself and every entity up its chain enabled.
    pub fn is_active(&self, component: ComponentId) -> bool {
        self.components
            .get(&component)
            .is_some_and(|s| s.enabled && self.is_enabled_in_hierarchy(s.entity))
    }

    pub fn execution_order(&self, component: ComponentId) -> Option<i32> {
        self.components.get(&component).map(|s| s.execution_order)
    }

    pub fn render_order(&self, component: ComponentId) -> Option<i32> {
        self.components.get(&component).map(|s| s.render_order)
    }

    /// Takes effect at the next update's sort step.
    pub fn set_execution_order(&mut self, component: ComponentId, order: i32) {
        if let Some(slot) = self.components.get_mut(&component) {
            slot.execution_order = order;
            if slot.mounted && slot.capabilities.is_updatable() {
                self.updatable.mark_dirty();
            }
        }
    }

    /// Takes effect at the next update's sort step.
    pub fn set_render_order(&mut self, component: ComponentId, order: i32) {
        if let Some(slot) = self.components.get_mut(&component) {
            slot.render_order = order;
            if slot.mounted && slot.capabilities.is_renderable() {
                self.renderable.mark_dirty();
            }
        }
    }

    // --- Scheduling state ---

    /// Mounted components with update or fixed update, in execution order.
    pub fn updatable(&self) -> &[ComponentId] {
        self.updatable.as_slice()
    }

    /// Mounted components with render, in render order.
    pub fn renderable(&self) -> &[ComponentId] {
        self.renderable.as_slice()
    }

    pub fn pending_additions(&self) -> &[EntityId] {
        &self.entities_to_add
    }

    pub fn pending_removals(&self) -> &[EntityId] {
        &self.entities_to_remove
    }

    /// Flag as mounted. Returns the capability mask on the transition,
    /// `None` if already mounted or unknown.
    pub(crate) fn mark_mounted(&mut self, component: ComponentId) -> Option<Capabilities> {
        let slot = self.components.get_mut(&component)?;
        if slot.mounted {
            return None;
        }
        slot.mounted = true;
        Some(slot.capabilities)
    }

    pub(crate) fn enlist(&mut self, component: ComponentId, capabilities: Capabilities) {
        if capabilities.is_updatable() {
            self.updatable.push(component);
        }
        if capabilities.is_renderable() {
            self.renderable.push(component);
        }
    }

    /// Clear the mounted flag and purge from both lists. Returns the
    /// capability mask on the transition and whether the component was in
    /// either list. Both lists are always purged, so the caller sees one
    /// transition even for a component held in both.
    pub(crate) fn unmount(&mut self, component: ComponentId) -> Option<(Capabilities, bool)> {
        let slot = self.components.get_mut(&component)?;
        if !slot.mounted {
            return None;
        }
        slot.mounted = false;
        let capabilities = slot.capabilities;
        let in_updatable = self.updatable.remove(&component);
        let in_renderable = self.renderable.remove(&component);
        Some((capabilities, in_updatable || in_renderable))
    }

    /// Drop the parent link of an unmounted subtree root, unless the parent
    /// took it back before the drain.
    pub(crate) fn release_parent(&mut self, entity: EntityId) {
        let Some(parent) = self.parent(entity) else {
            return;
        };
        let reattached = self.children(parent).contains(&entity);
        if !reattached {
            if let Some(node) = self.entities.get_mut(&entity) {
                node.parent = None;
            }
        }
    }

    /// Re-sort both cached lists if either is dirty, or unconditionally when
    /// `force` is set.
    pub(crate) fn resort(&mut self, force: bool) {
        if force {
            self.updatable.mark_dirty();
            self.renderable.mark_dirty();
        }
        let components = &self.components;
        let updated = self
            .updatable
            .resort_by_key(|id| components.get(id).map_or(0, |s| s.execution_order));
        let rendered = self
            .renderable
            .resort_by_key(|id| components.get(id).map_or(0, |s| s.render_order));
        if updated || rendered {
            tracing::trace!(
                updatable = self.updatable.len(),
                renderable = self.renderable.len(),
                "cached lists re-sorted"
            );
        }
    }

    /// Run `f` with the component taken out of its slot, so the hook can
    /// freely edit the rest of the scene. Returns `None` if the component is
    /// unknown or already running.
    pub(crate) fn with_component<R>(
        &mut self,
        component: ComponentId,
        f: impl FnOnce(&mut dyn Component, &mut SceneAccess<'_>) -> R,
    ) -> Option<R> {
        let slot = self.components.get_mut(&component)?;
        let entity = slot.entity;
        let mut behavior = slot.behavior.take()?;
        let result = {
            let mut access = SceneAccess {
                scene: self,
                component,
                entity,
            };
            f(&mut *behavior, &mut access)
        };
        if let Some(slot) = self.components.get_mut(&component) {
            slot.behavior = Some(behavior);
        }
        Some(result)
    }
}

/// What a component hook may do to its scene: read anything, and make the
/// same enqueue-only structural edits user code can make.
pub struct SceneAccess<'a> {
    scene: &'a mut Scene,
    component: ComponentId,
    entity: EntityId,
}

impl Deref for SceneAccess<'_> {
    type Target = Scene;

    fn deref(&self) -> &Scene {
        self.scene
    }
}

impl SceneAccess<'_> {
    /// The component whose hook is running.
    pub fn this(&self) -> ComponentId {
        self.component
    }

    /// The entity that component is attached to.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn spawn(&mut self, blueprint: Entity) -> EntityId {
        self.scene.spawn(blueprint)
    }

    pub fn attach(&mut self, parent: EntityId, blueprint: Entity) -> EntityId {
        self.scene.attach(parent, blueprint)
    }

    pub fn add_child(&mut self, parent: EntityId, children: &[EntityId]) {
        self.scene.add_child(parent, children);
    }

    pub fn remove_child(&mut self, parent: EntityId, children: &[EntityId]) {
        self.scene.remove_child(parent, children);
    }

    pub fn despawn(&mut self, entity: EntityId) -> Result<(), SceneError> {
        self.scene.despawn(entity)
    }

    pub fn set_entity_enabled(&mut self, entity: EntityId, enabled: bool) {
        self.scene.set_entity_enabled(entity, enabled);
    }

    pub fn set_component_enabled(&mut self, component: ComponentId, enabled: bool) {
        self.scene.set_component_enabled(component, enabled);
    }

    /// Stop receiving update and render calls; the component stays mounted.
    pub fn disable_self(&mut self) {
        self.scene.set_component_enabled(self.component, false);
    }

    pub fn set_execution_order(&mut self, component: ComponentId, order: i32) {
        self.scene.set_execution_order(component, order);
    }

    pub fn set_render_order(&mut self, component: ComponentId, order: i32) {
        self.scene.set_render_order(component, order);
    }

    /// Mutable access to another component. `None` for the running one.
    pub fn component_mut<T: Component>(&mut self, component: ComponentId) -> Option<&mut T> {
        self.scene.component_mut(component)
    }
}
