pub mod canvas;
pub mod font;

use crate::face::placement::TextBounds;

/// Paint used for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Solid white (interactive mode)
    Filled,
    /// Black fill with a white glow (ambient mode)
    Outlined,
}

/// One drawing step produced by the face for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface with an RGB color
    Clear { r: u8, g: u8, b: u8 },
    /// Draw `text` with its baseline origin at (x, y)
    Text {
        text: String,
        x: i32,
        y: i32,
        style: TextStyle,
    },
}

/// Ordered draw commands for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Text commands in draw order.
    pub fn texts(&self) -> impl Iterator<Item = (&str, i32, i32, TextStyle)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, x, y, style } => Some((text.as_str(), *x, *y, *style)),
            DrawCommand::Clear { .. } => None,
        })
    }
}

/// Measures the ink box of a string in the active font and size.
pub trait TextMeasurer {
    fn measure(&self, text: &str) -> TextBounds;
}
