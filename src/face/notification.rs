/// Unread-notification dot drawn with the time text.
use crate::face::placement::{Position, TextBounds};

/// Glyph used for the dot (BULLET OPERATOR).
pub const NOTIFICATION_DOT: &str = "\u{2219}";

/// Gap (px) between the time baseline and the dot in `BelowText` mode.
pub const BELOW_TEXT_GAP: i32 = 45;

/// Vertical anchoring of the dot relative to the time text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DotAnchor {
    /// Fixed gap under the time baseline
    #[default]
    BelowText,
    /// Inside the lower part of the time's ink box
    WithinText,
}

/// Baseline origin for the dot, centered horizontally on the time text.
pub fn dot_position(
    anchor: DotAnchor,
    time_at: Position,
    time: TextBounds,
    dot: TextBounds,
) -> Position {
    let x = time_at.x + (time.width as i32 / 2) - (dot.width as i32 / 2);
    let y = match anchor {
        DotAnchor::BelowText => time_at.y + dot.height as i32 + BELOW_TEXT_GAP,
        DotAnchor::WithinText => time_at.y + time.height as i32 - dot.height as i32,
    };
    Position::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_centered_under_text() {
        let time = TextBounds::new(200, 80, -80);
        let dot = TextBounds::new(10, 10, -40);
        let at = Position::new(50, 150);

        let below = dot_position(DotAnchor::BelowText, at, time, dot);
        assert_eq!(below, Position::new(50 + 100 - 5, 150 + 10 + 45));

        let within = dot_position(DotAnchor::WithinText, at, time, dot);
        assert_eq!(within, Position::new(145, 150 + 80 - 10));
    }
}
