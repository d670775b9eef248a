//! The component contract: capability mask, hooks, and the arena slot that
//! carries a component's scheduling fields.

use std::any::{Any, TypeId};
use std::ops::BitOr;

use scenic_common::{EntityId, RenderContext, UpdateContext};

use crate::scene::SceneAccess;

/// Which hooks a component implements.
///
/// Read once when the component is attached; the scene sorts components into
/// its cached lists by this mask instead of probing hooks every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Self = Self(0);
    pub const DID_MOUNT: Self = Self(1 << 0);
    pub const WILL_UNMOUNT: Self = Self(1 << 1);
    pub const UPDATE: Self = Self(1 << 2);
    pub const FIXED_UPDATE: Self = Self(1 << 3);
    pub const RENDER: Self = Self(1 << 4);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Belongs in the scene's updatable list.
    pub const fn is_updatable(self) -> bool {
        self.intersects(Self(Self::UPDATE.0 | Self::FIXED_UPDATE.0))
    }

    /// Belongs in the scene's renderable list.
    pub const fn is_renderable(self) -> bool {
        self.contains(Self::RENDER)
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Outcome of one update or fixed update call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The component finished its work for this pass.
    Complete,
    /// The component has more work; the pass calls the same hook again on
    /// the next pull.
    Pending,
}

/// Upcast helper so concrete component types can be recovered from
/// `dyn Component`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of per-frame behavior attached to exactly one entity.
///
/// Every hook has a no-op default. `capabilities` declares which ones the
/// scene should actually schedule.
pub trait Component: AsAny {
    fn capabilities(&self) -> Capabilities;

    /// Initial sort key for the update list. Lower runs first.
    fn execution_order(&self) -> i32 {
        0
    }

    /// Initial sort key for the render list. Lower runs first.
    fn render_order(&self) -> i32 {
        0
    }

    fn did_mount(&mut self, _scene: &mut SceneAccess<'_>) {}

    fn will_unmount(&mut self, _scene: &mut SceneAccess<'_>) {}

    fn update(&mut self, _scene: &mut SceneAccess<'_>, _ctx: &mut UpdateContext<'_>) -> Progress {
        Progress::Complete
    }

    fn fixed_update(
        &mut self,
        _scene: &mut SceneAccess<'_>,
        _ctx: &mut UpdateContext<'_>,
    ) -> Progress {
        Progress::Complete
    }

    fn render(&mut self, _scene: &mut SceneAccess<'_>, _ctx: &mut RenderContext<'_>) {}

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Arena storage for one attached component.
///
/// `behavior` is `None` only while one of its own hooks is running.
pub(crate) struct ComponentSlot {
    pub(crate) behavior: Option<Box<dyn Component>>,
    pub(crate) entity: EntityId,
    pub(crate) enabled: bool,
    pub(crate) execution_order: i32,
    pub(crate) render_order: i32,
    pub(crate) capabilities: Capabilities,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) mounted: bool,
}

impl ComponentSlot {
    pub(crate) fn new(behavior: Box<dyn Component>, entity: EntityId) -> Self {
        let type_id = <dyn Component as AsAny>::as_any(&*behavior).type_id();
        Self {
            entity,
            enabled: true,
            execution_order: behavior.execution_order(),
            render_order: behavior.render_order(),
            capabilities: behavior.capabilities(),
            type_id,
            type_name: behavior.type_name(),
            mounted: false,
            behavior: Some(behavior),
        }
    }
}

pub(crate) fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    <dyn Component as AsAny>::as_any(component).downcast_ref::<T>()
}

pub(crate) fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    <dyn Component as AsAny>::as_any_mut(component).downcast_mut::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample;

    impl Component for Sample {
        fn capabilities(&self) -> Capabilities {
            Capabilities::UPDATE | Capabilities::RENDER
        }

        fn execution_order(&self) -> i32 {
            7
        }
    }

    struct Other;

    impl Component for Other {
        fn capabilities(&self) -> Capabilities {
            Capabilities::NONE
        }
    }

    #[test]
    fn capability_mask_queries() {
        let caps = Capabilities::DID_MOUNT | Capabilities::FIXED_UPDATE;
        assert!(caps.contains(Capabilities::DID_MOUNT));
        assert!(!caps.contains(Capabilities::UPDATE));
        assert!(caps.is_updatable());
        assert!(!caps.is_renderable());
        assert!(!Capabilities::NONE.is_updatable());
        assert_eq!(Capabilities::default(), Capabilities::NONE);
    }

    #[test]
    fn slot_reads_fields_once() {
        let slot = ComponentSlot::new(Box::new(Sample), EntityId::new());
        assert_eq!(slot.execution_order, 7);
        assert_eq!(slot.render_order, 0);
        assert!(slot.capabilities.is_updatable());
        assert!(slot.capabilities.is_renderable());
        assert_eq!(slot.type_id, TypeId::of::<Sample>());
        assert!(slot.type_name.ends_with("Sample"));
        assert!(slot.enabled);
        assert!(!slot.mounted);
    }

    #[test]
    fn downcast_is_exact_type() {
        let boxed: Box<dyn Component> = Box::new(Sample);
        assert!(downcast_ref::<Sample>(&*boxed).is_some());
        assert!(downcast_ref::<Other>(&*boxed).is_none());
    }
}
