/// Time text placement.
/// Picks a random origin for the time string so no pixel stays lit for long,
/// keeping the text away from the cut-off corners of round screens.
use rand::Rng;
use tracing::{debug, warn};

/// Combined edge clearance (px) a round-screen sample must reach.
pub const DEFAULT_MIN_CLEARANCE: i32 = 20;

/// Samples drawn on a round screen before settling for the best one seen.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayShape {
    #[default]
    Rectangular,
    Round,
}

/// Usable pixel region for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawableArea {
    pub width: u32,
    pub height: u32,
}

impl DrawableArea {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Ink box of a measured string.
///
/// `top` is the signed distance from the baseline to the top edge of the box,
/// so it is zero or negative for ordinary text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBounds {
    pub width: u32,
    pub height: u32,
    pub top: i32,
}

impl TextBounds {
    pub fn new(width: u32, height: u32, top: i32) -> Self {
        Self { width, height, top }
    }
}

/// Baseline origin of the time text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Outcome of one placement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub position: Position,
    /// Clearance score of the returned sample (round screens only)
    pub clearance: Option<i32>,
    pub attempts: u32,
    /// False when the round-screen fallback was taken
    pub accepted: bool,
}

/// Placement parameters, fixed for the lifetime of the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRule {
    pub shape: DisplayShape,
    pub min_clearance: i32,
    pub max_attempts: u32,
}

impl PlacementRule {
    pub fn new(shape: DisplayShape) -> Self {
        Self {
            shape,
            min_clearance: DEFAULT_MIN_CLEARANCE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_clearance(mut self, min_clearance: i32) -> Self {
        self.min_clearance = min_clearance;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn place<R: Rng>(
        &self,
        area: DrawableArea,
        bounds: TextBounds,
        rng: &mut R,
    ) -> Placement {
        if bounds.width > area.width || bounds.height > area.height {
            warn!(
                "Text {}x{} does not fit drawable area {}x{}, pinning to origin",
                bounds.width, bounds.height, area.width, area.height
            );
        }

        if self.shape == DisplayShape::Rectangular {
            return Placement {
                position: sample(area, bounds, rng),
                clearance: None,
                attempts: 1,
                accepted: true,
            };
        }

        let max_attempts = self.max_attempts.max(1);
        let mut best: Option<(Position, i32)> = None;

        for attempt in 1..=max_attempts {
            let position = sample(area, bounds, rng);
            let score = clearance(area, bounds, position);

            if score >= self.min_clearance {
                return Placement {
                    position,
                    clearance: Some(score),
                    attempts: attempt,
                    accepted: true,
                };
            }

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((position, score));
            }
        }

        // max_attempts >= 1, so at least one sample was recorded
        let (position, score) = best.unwrap_or_default();
        debug!(
            "No sample reached clearance {} in {} attempts, using best ({}, {}) with {}",
            self.min_clearance, max_attempts, position.x, position.y, score
        );
        Placement {
            position,
            clearance: Some(score),
            attempts: max_attempts,
            accepted: false,
        }
    }
}

fn sample<R: Rng>(area: DrawableArea, bounds: TextBounds, rng: &mut R) -> Position {
    let x_span = area.width.saturating_sub(bounds.width);
    let y_span = area.height.saturating_sub(bounds.height);

    let x = rng.random_range(0..=x_span) as i32;
    let y = rng.random_range(0..=y_span) as i32 - bounds.top;
    Position::new(x, y)
}

/// Sum of the distances to the nearer horizontal and nearer vertical edge.
fn clearance(area: DrawableArea, bounds: TextBounds, position: Position) -> i32 {
    let x_distance = position
        .x
        .min(area.width as i32 - (position.x + bounds.width as i32));
    let y_distance = position
        .y
        .min(area.height as i32 - (position.y + bounds.height as i32));
    x_distance + y_distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn place_text(
        area: DrawableArea,
        bounds: TextBounds,
        shape: DisplayShape,
        rng: &mut StdRng,
    ) -> Position {
        PlacementRule::new(shape).place(area, bounds, rng).position
    }

    fn assert_in_bounds(area: DrawableArea, bounds: TextBounds, pos: Position) {
        let top_edge = pos.y + bounds.top;
        assert!(pos.x >= 0, "x {} left of screen", pos.x);
        assert!(
            pos.x + bounds.width as i32 <= area.width as i32,
            "x {} overflows width",
            pos.x
        );
        assert!(top_edge >= 0, "top edge {} above screen", top_edge);
        assert!(
            top_edge + bounds.height as i32 <= area.height as i32,
            "top edge {} overflows height",
            top_edge
        );
    }

    #[test]
    fn test_rectangular_always_in_bounds() {
        let areas = [(320, 320), (454, 454), (100, 50), (390, 450)];
        let texts = [(90, 40, 0), (250, 87, -87), (100, 50, 0), (10, 10, -8)];

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            for &(w, h) in &areas {
                for &(tw, th, top) in &texts {
                    if tw > w || th > h {
                        continue;
                    }
                    let area = DrawableArea::new(w, h);
                    let bounds = TextBounds::new(tw, th, top);
                    let pos = place_text(area, bounds, DisplayShape::Rectangular, &mut rng);
                    assert_in_bounds(area, bounds, pos);
                }
            }
        }
    }

    #[test]
    fn test_round_in_bounds_and_clear() {
        let area = DrawableArea::new(454, 454);
        let bounds = TextBounds::new(250, 87, 0);
        let rule = PlacementRule::new(DisplayShape::Round);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let placement = rule.place(area, bounds, &mut rng);
            assert_in_bounds(area, bounds, placement.position);
            assert!(placement.attempts <= DEFAULT_MAX_ATTEMPTS);
            if placement.accepted {
                assert!(placement.clearance.unwrap() >= DEFAULT_MIN_CLEARANCE);
            }
        }
    }

    #[test]
    fn test_round_tight_clearance_terminates() {
        let area = DrawableArea::new(200, 200);
        let bounds = TextBounds::new(190, 90, 0);
        let rule = PlacementRule::new(DisplayShape::Round).with_clearance(20);

        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let placement = rule.place(area, bounds, &mut rng);
            assert!(placement.attempts >= 1 && placement.attempts <= 50);
            assert_in_bounds(area, bounds, placement.position);
        }
    }

    #[test]
    fn test_unreachable_clearance_falls_back_to_best() {
        let area = DrawableArea::new(200, 200);
        let bounds = TextBounds::new(190, 90, 0);
        let rule = PlacementRule::new(DisplayShape::Round)
            .with_clearance(10_000)
            .with_max_attempts(50);

        let mut rng = StdRng::seed_from_u64(7);
        let placement = rule.place(area, bounds, &mut rng);
        assert!(!placement.accepted);
        assert_eq!(placement.attempts, 50);
        assert_in_bounds(area, bounds, placement.position);

        // Replaying the same samples, none scores higher than the fallback
        let mut replay = StdRng::seed_from_u64(7);
        let best = (0..50)
            .map(|_| clearance(area, bounds, sample(area, bounds, &mut replay)))
            .max()
            .unwrap();
        assert_eq!(placement.clearance, Some(best));
    }

    #[test]
    fn test_zero_attempts_still_samples_once() {
        let rule = PlacementRule::new(DisplayShape::Round)
            .with_clearance(10_000)
            .with_max_attempts(0);
        assert_eq!(rule.max_attempts, 1);

        let mut rng = StdRng::seed_from_u64(1);
        let placement = rule.place(DrawableArea::new(50, 50), TextBounds::new(10, 10, 0), &mut rng);
        assert_eq!(placement.attempts, 1);
    }

    #[test]
    fn test_exact_fit_is_origin() {
        let area = DrawableArea::new(100, 50);
        let bounds = TextBounds::new(100, 50, 0);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(
                place_text(area, bounds, DisplayShape::Rectangular, &mut rng),
                Position::new(0, 0)
            );
            assert_eq!(
                place_text(area, bounds, DisplayShape::Round, &mut rng),
                Position::new(0, 0)
            );
        }
    }

    #[test]
    fn test_baseline_offset_applied() {
        // A single valid top edge of 0 puts the baseline at -top
        let area = DrawableArea::new(120, 90);
        let bounds = TextBounds::new(120, 90, -70);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            place_text(area, bounds, DisplayShape::Rectangular, &mut rng),
            Position::new(0, 70)
        );
    }

    #[test]
    fn test_oversized_text_does_not_panic() {
        let area = DrawableArea::new(40, 40);
        let bounds = TextBounds::new(80, 60, 0);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            place_text(area, bounds, DisplayShape::Round, &mut rng),
            Position::new(0, 0)
        );
    }

    #[test]
    fn test_clearance_uses_nearer_edges() {
        let area = DrawableArea::new(200, 200);
        let bounds = TextBounds::new(100, 50, 0);
        assert_eq!(clearance(area, bounds, Position::new(10, 30)), 10 + 30);
        assert_eq!(clearance(area, bounds, Position::new(95, 145)), 5 + 5);
        assert_eq!(clearance(area, bounds, Position::new(50, 75)), 50 + 75);
    }
}
