use gazehunt_common::Eye;

use crate::command::DrawCommand;

/// Failures a rendering backend can report. None of them is recoverable:
/// the frame loop stops on the first one.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: &'static str, log: String },
    #[error("shader program failed to link: {0}")]
    ShaderLink(String),
    #[error("render backend error: {0}")]
    Backend(String),
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer receives the draw commands for one eye, in order, and produces
/// output. It never touches scene state.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Execute one eye's draw commands.
    fn render(&mut self, eye: Eye, commands: &[DrawCommand]) -> Result<Self::Output, RenderError>;
}

/// Produces a human-readable dump of each eye's draw list.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, eye: Eye, commands: &[DrawCommand]) -> Result<String, RenderError> {
        let mut out = String::new();
        out.push_str(&format!("=== {eye} eye: {} draws ===\n", commands.len()));
        for cmd in commands {
            let light = cmd.uniforms.light();
            let origin = cmd.uniforms.mvp().w_axis;
            out.push_str(&format!(
                "  {:<5} mesh={:<12} indices={:>2} light=({:.2}, {:.2}, {:.2}) clip_origin=({:.2}, {:.2}, {:.2}, {:.2})\n",
                cmd.program.name(),
                cmd.mesh.name(),
                cmd.index_count,
                light.x,
                light.y,
                light.z,
                origin.x,
                origin.y,
                origin.z,
                origin.w,
            ));
        }
        Ok(out)
    }
}

/// Keeps every submitted draw list. Used by the headless host and by tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    submissions: Vec<(Eye, Vec<DrawCommand>)>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> &[(Eye, Vec<DrawCommand>)] {
        &self.submissions
    }

    pub fn last(&self) -> Option<&(Eye, Vec<DrawCommand>)> {
        self.submissions.last()
    }

    pub fn draw_count(&self) -> usize {
        self.submissions.iter().map(|(_, cmds)| cmds.len()).sum()
    }

    pub fn clear(&mut self) {
        self.submissions.clear();
    }
}

impl Renderer for RecordingRenderer {
    type Output = usize;

    fn render(&mut self, eye: Eye, commands: &[DrawCommand]) -> Result<usize, RenderError> {
        tracing::trace!(%eye, draws = commands.len(), "recording draw list");
        self.submissions.push((eye, commands.to_vec()));
        Ok(commands.len())
    }
}
