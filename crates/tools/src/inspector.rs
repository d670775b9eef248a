use std::fmt::Write;

use scenic_common::{ComponentId, EntityId};
use scenic_scene::Scene;

/// Scene inspector for developer tooling.
///
/// Read-only queries against a scene for debugging, profiling and CLI output.
pub struct SceneInspector;

impl SceneInspector {
    /// Counts of entities, components and scheduling state.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let mounted = scene
            .subtree(scene.root())
            .into_iter()
            .flat_map(|id| scene.components(id).to_vec())
            .filter(|c| scene.is_mounted(*c))
            .count();
        SceneSummary {
            entity_count: scene.entity_count(),
            component_count: scene.component_count(),
            mounted_components: mounted,
            updatable: scene.updatable().len(),
            renderable: scene.renderable().len(),
            pending_additions: scene.pending_additions().len(),
            pending_removals: scene.pending_removals().len(),
        }
    }

    pub fn inspect_entity(scene: &Scene, id: EntityId) -> Option<EntityInfo> {
        let name = scene.name(id)?.to_string();
        let components = scene
            .components(id)
            .iter()
            .filter_map(|c| Self::inspect_component(scene, *c))
            .collect();
        Some(EntityInfo {
            id,
            name,
            parent: scene.parent(id),
            child_count: scene.children(id).len(),
            enabled: scene.is_entity_enabled(id),
            in_scene: scene.is_in_scene(id),
            components,
        })
    }

    pub fn inspect_component(scene: &Scene, id: ComponentId) -> Option<ComponentInfo> {
        Some(ComponentInfo {
            id,
            type_name: scene.component_type_name(id)?,
            mounted: scene.is_mounted(id),
            enabled: scene.is_component_enabled(id),
            execution_order: scene.execution_order(id)?,
            render_order: scene.render_order(id)?,
        })
    }

    /// Indented hierarchy below the root, one entity per line followed by
    /// its components.
    pub fn tree(scene: &Scene) -> String {
        let mut out = String::new();
        Self::write_entity(scene, scene.root(), 0, &mut out);
        out
    }

    fn write_entity(scene: &Scene, id: EntityId, depth: usize, out: &mut String) {
        let Some(info) = Self::inspect_entity(scene, id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let _ = writeln!(out, "{indent}{info}");
        for component in &info.components {
            let _ = writeln!(out, "{indent}  - {component}");
        }
        for child in scene.children(id) {
            // A stale second link is listed under both parents; only recurse
            // through the live one.
            if scene.parent(*child) == Some(id) {
                Self::write_entity(scene, *child, depth + 1, out);
            }
        }
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub entity_count: usize,
    pub component_count: usize,
    pub mounted_components: usize,
    pub updatable: usize,
    pub renderable: usize,
    pub pending_additions: usize,
    pub pending_removals: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: entities={} components={} mounted={} updatable={} renderable={} pending=+{}/-{}",
            self.entity_count,
            self.component_count,
            self.mounted_components,
            self.updatable,
            self.renderable,
            self.pending_additions,
            self.pending_removals
        )
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    pub parent: Option<EntityId>,
    pub child_count: usize,
    pub enabled: bool,
    pub in_scene: bool,
    pub components: Vec<ComponentInfo>,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name, self.id.short())?;
        if !self.enabled {
            write!(f, " (disabled)")?;
        }
        if !self.in_scene {
            write!(f, " (detached)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ComponentInfo {
    pub id: ComponentId,
    pub type_name: &'static str,
    pub mounted: bool,
    pub enabled: bool,
    pub execution_order: i32,
    pub render_order: i32,
}

impl ComponentInfo {
    /// Type name without its module path.
    pub fn short_type_name(&self) -> &'static str {
        self.type_name.rsplit("::").next().unwrap_or(self.type_name)
    }
}

impl std::fmt::Display for ComponentInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] order={} render={}",
            self.short_type_name(),
            self.id.short(),
            self.execution_order,
            self.render_order
        )?;
        if !self.mounted {
            write!(f, " (unmounted)")?;
        }
        if !self.enabled {
            write!(f, " (disabled)")?;
        }
        Ok(())
    }
}
