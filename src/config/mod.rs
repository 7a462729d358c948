use std::path::PathBuf;

use crate::face::notification::DotAnchor;
use crate::face::placement::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MIN_CLEARANCE, DisplayShape};

/// Top-level watch face configuration
#[derive(Debug, Clone)]
pub struct FaceConfig {
    pub width: u32,
    pub height: u32,
    pub shape: DisplayShape,
    /// Combined edge clearance (px) required on round displays
    pub min_clearance: i32,
    /// Placement retries before falling back to the best sample
    pub max_attempts: u32,
    pub font_path: PathBuf,
    pub text_size: f32,
    pub dot_anchor: DotAnchor,
    /// Unread notification count reported at startup
    pub unread: u32,
    pub output_mode: OutputMode,
    pub output_path: PathBuf,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            width: 454,
            height: 454,
            shape: DisplayShape::Round,
            min_clearance: DEFAULT_MIN_CLEARANCE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            font_path: PathBuf::from("assets/DejaVuSans.ttf"),
            text_size: 120.0,
            dot_anchor: DotAnchor::default(),
            unread: 0,
            output_mode: OutputMode::default(),
            output_path: PathBuf::from("face.png"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Overwrite a PNG with every frame
    #[default]
    Png,
    /// Output raw RGBA pixels to stdout (for piping)
    Raw,
    /// Render but discard (log only)
    None,
}

impl std::str::FromStr for OutputMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputMode::Png),
            "raw" | "stdout" => Ok(OutputMode::Raw),
            "none" | "off" => Ok(OutputMode::None),
            _ => Err(format!("Unknown output mode: {s}")),
        }
    }
}

impl std::str::FromStr for DisplayShape {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round" | "circle" => Ok(DisplayShape::Round),
            "rect" | "rectangular" | "square" => Ok(DisplayShape::Rectangular),
            _ => Err(format!("Unknown display shape: {s}")),
        }
    }
}

impl std::str::FromStr for DotAnchor {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "below" => Ok(DotAnchor::BelowText),
            "within" | "inside" => Ok(DotAnchor::WithinText),
            _ => Err(format!("Unknown dot anchor: {s}")),
        }
    }
}
