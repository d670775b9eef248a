use scenic_common::EntityId;

/// Errors from scene operations that can fail.
///
/// Tree edits (`add_child`, `remove_child`) and lookups never produce these;
/// invalid handles there are ignored and absence is reported as `None`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("entity {0:?} not found")]
    EntityNotFound(EntityId),
    #[error("the scene root cannot be despawned")]
    RootEntity,
    #[error("entity {entity:?} is still attached to {parent:?}")]
    StillAttached { entity: EntityId, parent: EntityId },
    #[error("entity {0:?} still has mounted components")]
    StillMounted(EntityId),
}
