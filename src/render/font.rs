/// Font loading and text measurement using rusttype.
use std::path::Path;

use rusttype::{Font, PositionedGlyph, Scale, point};
use tracing::debug;

use crate::error::FaceError;
use crate::face::placement::TextBounds;
use crate::render::TextMeasurer;

pub struct FaceFont {
    font: Font<'static>,
    scale: Scale,
}

impl FaceFont {
    pub fn load(path: &Path, size: f32) -> Result<Self, FaceError> {
        let data = std::fs::read(path).map_err(|source| FaceError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Font::try_from_vec(data).ok_or_else(|| FaceError::FontParse {
            path: path.to_path_buf(),
        })?;
        debug!("Loaded font {} at {}px", path.display(), size);
        Ok(Self {
            font,
            scale: Scale::uniform(size),
        })
    }

    /// Glyphs for `text` with the baseline origin at (x, y).
    pub fn layout(&self, text: &str, x: f32, y: f32) -> Vec<PositionedGlyph<'static>> {
        self.font
            .layout(text, self.scale, point(x, y))
            .collect()
    }
}

impl TextMeasurer for FaceFont {
    fn measure(&self, text: &str) -> TextBounds {
        let boxes = self
            .layout(text, 0.0, 0.0)
            .into_iter()
            .filter_map(|g| g.pixel_bounding_box());

        let mut extent: Option<(i32, i32, i32, i32)> = None;
        for bb in boxes {
            extent = Some(match extent {
                None => (bb.min.x, bb.min.y, bb.max.x, bb.max.y),
                Some((x0, y0, x1, y1)) => (
                    x0.min(bb.min.x),
                    y0.min(bb.min.y),
                    x1.max(bb.max.x),
                    y1.max(bb.max.y),
                ),
            });
        }

        match extent {
            Some((x0, y0, x1, y1)) => TextBounds::new((x1 - x0) as u32, (y1 - y0) as u32, y0),
            // whitespace or glyphs the font lacks
            None => TextBounds::default(),
        }
    }
}
