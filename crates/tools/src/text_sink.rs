use glam::Vec3;
use scenic_common::{DrawCommand, DrawSink};

/// Draw sink that records every command as a line of text.
///
/// Stands in for a GPU backend in CLI output and tests.
#[derive(Debug, Default)]
pub struct TextSink {
    commands: Vec<DrawCommand>,
}

impl TextSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop everything recorded so far, e.g. between frames.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// One line per command: label and the transform's translation.
    pub fn output(&self) -> String {
        let mut out = format!("=== Draw list ({} commands) ===\n", self.commands.len());
        for command in &self.commands {
            let p: Vec3 = command.transform.w_axis.truncate();
            out.push_str(&format!(
                "  {} at ({:.2}, {:.2}, {:.2})\n",
                command.label, p.x, p.y, p.z
            ));
        }
        out
    }
}

impl DrawSink for TextSink {
    fn push(&mut self, command: DrawCommand) {
        tracing::trace!(label = %command.label, "draw");
        self.commands.push(command);
    }
}
