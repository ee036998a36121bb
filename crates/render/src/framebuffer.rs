use glam::Mat4;
use vesta_common::Color;

/// One recorded draw. The backend-independent pipeline records what it
/// would submit; a GPU backend replays these against a real device.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub mesh: String,
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub lit: bool,
    pub face_cull: bool,
}

/// Records draw commands for one frame and tracks presentation.
#[derive(Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    clear_color: Color,
    commands: Vec<DrawCommand>,
    presented_frames: u64,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            clear_color: Color::BLACK,
            commands: Vec::new(),
            presented_frames: 0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Discard the previous frame's commands and set the clear color.
    pub fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.commands.clear();
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn record(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Mark the recorded frame as shown. Recording state is kept until the
    /// next clear so callers can still inspect what was presented.
    pub fn present(&mut self) {
        self.presented_frames += 1;
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }
}
