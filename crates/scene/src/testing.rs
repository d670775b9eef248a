//! Components shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use scenic_common::{DrawCommand, RenderContext, UpdateContext};

use crate::component::{Capabilities, Component, Progress};
use crate::scene::SceneAccess;

/// Shared, ordered record of hook calls.
#[derive(Clone, Default)]
pub(crate) struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Entries recorded since the last take.
    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }
}

/// Counts update and fixed update calls.
#[derive(Debug, Default)]
pub(crate) struct Counter {
    pub(crate) count: u32,
    pub(crate) fixed: u32,
}

impl Component for Counter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::FIXED_UPDATE
    }

    fn update(&mut self, _scene: &mut SceneAccess<'_>, _ctx: &mut UpdateContext<'_>) -> Progress {
        self.count += 1;
        Progress::Complete
    }

    fn fixed_update(
        &mut self,
        _scene: &mut SceneAccess<'_>,
        _ctx: &mut UpdateContext<'_>,
    ) -> Progress {
        self.fixed += 1;
        Progress::Complete
    }
}

/// Logs `<hook>:<label>` for every hook it is scheduled for.
pub(crate) struct Recorder {
    label: String,
    log: Log,
    capabilities: Capabilities,
    execution_order: i32,
    render_order: i32,
}

impl Recorder {
    pub(crate) fn new(label: &str, log: &Log) -> Self {
        Self {
            label: label.to_string(),
            log: log.clone(),
            capabilities: Capabilities::DID_MOUNT
                | Capabilities::WILL_UNMOUNT
                | Capabilities::UPDATE
                | Capabilities::FIXED_UPDATE
                | Capabilities::RENDER,
            execution_order: 0,
            render_order: 0,
        }
    }

    pub(crate) fn with_caps(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub(crate) fn with_order(mut self, order: i32) -> Self {
        self.execution_order = order;
        self
    }

    pub(crate) fn with_render_order(mut self, order: i32) -> Self {
        self.render_order = order;
        self
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }
}

impl Component for Recorder {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn execution_order(&self) -> i32 {
        self.execution_order
    }

    fn render_order(&self) -> i32 {
        self.render_order
    }

    fn did_mount(&mut self, _scene: &mut SceneAccess<'_>) {
        self.log.push(format!("mount:{}", self.label));
    }

    fn will_unmount(&mut self, _scene: &mut SceneAccess<'_>) {
        self.log.push(format!("unmount:{}", self.label));
    }

    fn update(&mut self, _scene: &mut SceneAccess<'_>, _ctx: &mut UpdateContext<'_>) -> Progress {
        self.log.push(format!("update:{}", self.label));
        Progress::Complete
    }

    fn fixed_update(
        &mut self,
        _scene: &mut SceneAccess<'_>,
        _ctx: &mut UpdateContext<'_>,
    ) -> Progress {
        self.log.push(format!("fixed:{}", self.label));
        Progress::Complete
    }

    fn render(&mut self, _scene: &mut SceneAccess<'_>, ctx: &mut RenderContext<'_>) {
        self.log.push(format!("render:{}", self.label));
        ctx.graphics
            .push(DrawCommand::new(self.label.clone(), ctx.view_projection()));
    }
}

/// Spreads one update or fixed update over `chunks` steps.
pub(crate) struct Chunked {
    label: String,
    log: Log,
    chunks: u32,
    done: u32,
}

impl Chunked {
    pub(crate) fn new(label: &str, log: &Log, chunks: u32) -> Self {
        Self {
            label: label.to_string(),
            log: log.clone(),
            chunks,
            done: 0,
        }
    }

    fn step(&mut self, prefix: &str) -> Progress {
        self.done += 1;
        self.log.push(format!("{prefix}:{}:{}", self.label, self.done));
        if self.done < self.chunks {
            Progress::Pending
        } else {
            self.done = 0;
            Progress::Complete
        }
    }
}

impl Component for Chunked {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::FIXED_UPDATE
    }

    fn update(&mut self, _scene: &mut SceneAccess<'_>, _ctx: &mut UpdateContext<'_>) -> Progress {
        self.step("chunk")
    }

    fn fixed_update(
        &mut self,
        _scene: &mut SceneAccess<'_>,
        _ctx: &mut UpdateContext<'_>,
    ) -> Progress {
        self.step("fixed-chunk")
    }
}
