use scenic_common::{ComponentId, EntityId};

use crate::component::Component;

/// Owned description of an entity subtree, not yet part of any scene.
///
/// Components are supplied here, at construction time, and are attached to
/// the instantiated entity exactly once by [`Scene::spawn`](crate::Scene::spawn).
pub struct Entity {
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) components: Vec<Box<dyn Component>>,
    pub(crate) children: Vec<Entity>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Name, components and children in one call.
    pub fn from_parts(
        name: impl Into<String>,
        components: impl IntoIterator<Item = Box<dyn Component>>,
        children: impl IntoIterator<Item = Entity>,
    ) -> Self {
        Self::new(name)
            .with_components(components)
            .with_children(children)
    }

    pub fn with_component(mut self, component: impl Component) -> Self {
        self.components.push(Box::new(component));
        self
    }

    pub fn with_components(mut self, components: impl IntoIterator<Item = Box<dyn Component>>) -> Self {
        self.components.extend(components);
        self
    }

    pub fn with_child(mut self, child: Entity) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Entity>) -> Self {
        self.children.extend(children);
        self
    }

    /// Start disabled: none of the subtree's components run until re-enabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entities in this blueprint, itself included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Entity::subtree_len).sum::<usize>()
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("components", &self.components.len())
            .field("children", &self.children)
            .finish()
    }
}

/// Arena node for an instantiated entity.
#[derive(Debug, Clone)]
pub(crate) struct EntityNode {
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) components: Vec<ComponentId>,
}

impl EntityNode {
    pub(crate) fn new(name: String, enabled: bool) -> Self {
        Self {
            name,
            enabled,
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
        }
    }
}
