/// Watch face engine. All face state lives here and is driven by the
/// host's lifecycle callbacks.
use chrono::{DateTime, FixedOffset, Offset, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::{debug, info};

use crate::face::notification::{self, DotAnchor, NOTIFICATION_DOT};
use crate::face::placement::{DrawableArea, PlacementRule, Position, TextBounds};
use crate::face::time_text::{self, TimeChangeDetector};
use crate::host::{FaceHost, TimerHandle, WatchFaceStyle};
use crate::render::{DrawCommand, Frame, TextMeasurer, TextStyle};

/// Interactive-mode redraw period.
pub const INTERACTIVE_UPDATE_RATE_MS: i64 = 60_000;

pub const FACE_STYLE: WatchFaceStyle = WatchFaceStyle {
    accepts_tap_events: true,
    hide_notification_indicator: true,
};

/// Mutable per-face state, reset on destroy.
#[derive(Debug)]
struct FaceState {
    created: bool,
    ambient: bool,
    visible: bool,
    timezone_receiver_registered: bool,
    timezone: FixedOffset,
    detector: TimeChangeDetector,
    time_bounds: TextBounds,
    dot_bounds: TextBounds,
    position: Position,
    pending_tick: Option<TimerHandle>,
    placements: u64,
}

impl FaceState {
    fn new() -> Self {
        Self {
            created: false,
            ambient: false,
            visible: false,
            timezone_receiver_registered: false,
            timezone: Utc.fix(),
            detector: TimeChangeDetector::new(),
            time_bounds: TextBounds::default(),
            dot_bounds: TextBounds::default(),
            position: Position::default(),
            pending_tick: None,
            placements: 0,
        }
    }
}

pub struct WatchFaceEngine<R = StdRng> {
    rule: PlacementRule,
    dot_anchor: DotAnchor,
    rng: R,
    state: FaceState,
}

impl<R: Rng> WatchFaceEngine<R> {
    pub fn new(rule: PlacementRule, dot_anchor: DotAnchor, rng: R) -> Self {
        Self {
            rule,
            dot_anchor,
            rng,
            state: FaceState::new(),
        }
    }

    pub fn on_create(&mut self, host: &mut impl FaceHost, measurer: &impl TextMeasurer) {
        host.set_style(FACE_STYLE);
        self.state.dot_bounds = measurer.measure(NOTIFICATION_DOT);
        self.state.timezone = host.default_timezone();
        self.state.created = true;
        info!(
            "Watch face created ({:?}, min clearance {}px, {} attempts)",
            self.rule.shape, self.rule.min_clearance, self.rule.max_attempts
        );
    }

    pub fn on_destroy(&mut self, host: &mut impl FaceHost) {
        if let Some(handle) = self.state.pending_tick.take() {
            host.cancel_tick(handle);
        }
        self.unregister_receiver(host);
        self.state = FaceState::new();
        info!("Watch face destroyed");
    }

    /// Platform per-minute tick (delivered in ambient mode).
    pub fn on_time_tick(&mut self, host: &mut impl FaceHost) {
        host.invalidate();
    }

    pub fn on_ambient_mode_changed(&mut self, host: &mut impl FaceHost, ambient: bool) {
        self.state.ambient = ambient;
        info!("Ambient mode: {}", if ambient { "ON" } else { "OFF" });
        if ambient {
            host.invalidate();
        }
        self.update_timer(host);
    }

    pub fn on_visibility_changed(&mut self, host: &mut impl FaceHost, visible: bool) {
        self.state.visible = visible;
        debug!("Visibility: {}", visible);

        if visible {
            self.register_receiver(host);
            // the zone may have changed while we were hidden
            self.state.timezone = host.default_timezone();
            host.invalidate();
        } else {
            self.unregister_receiver(host);
        }

        self.update_timer(host);
    }

    pub fn on_timezone_changed(&mut self, host: &mut impl FaceHost) {
        self.state.timezone = host.default_timezone();
        info!("Timezone changed to {}", self.state.timezone);
        host.invalidate();
    }

    /// Deferred tick message. Stale handles (cancelled or superseded) are ignored.
    pub fn handle_update_time(&mut self, host: &mut impl FaceHost, handle: TimerHandle) {
        if self.state.pending_tick != Some(handle) {
            debug!("Ignoring stale tick {:?}", handle);
            return;
        }
        self.state.pending_tick = None;

        host.invalidate();
        if self.should_timer_be_running() {
            let delay = next_tick_delay(host.now_millis());
            self.state.pending_tick = Some(host.schedule_tick(delay));
            debug!("Next tick in {}ms", delay.as_millis());
        }
    }

    pub fn draw(
        &mut self,
        host: &impl FaceHost,
        measurer: &impl TextMeasurer,
        area: DrawableArea,
    ) -> Frame {
        let now = DateTime::<Utc>::from_timestamp_millis(host.now_millis()).unwrap_or_default();
        let time = time_text::format_time(&now.with_timezone(&self.state.timezone));

        let mut frame = Frame::default();
        frame.push(DrawCommand::Clear { r: 0, g: 0, b: 0 });

        // only move when the text changes, so mode switches don't make it jump
        if self.state.detector.observe(&time) {
            self.state.time_bounds = measurer.measure(&time);
            let placement = self.rule.place(area, self.state.time_bounds, &mut self.rng);
            self.state.position = placement.position;
            self.state.placements += 1;
            debug!(
                "Placed '{}' at ({}, {}) after {} attempt(s)",
                time, placement.position.x, placement.position.y, placement.attempts
            );
        }

        let style = self.text_style();
        let at = self.state.position;
        frame.push(DrawCommand::Text {
            text: time,
            x: at.x,
            y: at.y,
            style,
        });

        if host.unread_count() > 0 {
            let dot_at = notification::dot_position(
                self.dot_anchor,
                at,
                self.state.time_bounds,
                self.state.dot_bounds,
            );
            frame.push(DrawCommand::Text {
                text: NOTIFICATION_DOT.to_string(),
                x: dot_at.x,
                y: dot_at.y,
                style,
            });
        }

        frame
    }

    pub fn text_style(&self) -> TextStyle {
        if self.state.ambient {
            TextStyle::Outlined
        } else {
            TextStyle::Filled
        }
    }

    #[cfg(test)]
    pub fn is_created(&self) -> bool {
        self.state.created
    }

    pub fn is_ambient(&self) -> bool {
        self.state.ambient
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    #[cfg(test)]
    pub fn position(&self) -> Position {
        self.state.position
    }

    #[cfg(test)]
    pub fn pending_tick(&self) -> Option<TimerHandle> {
        self.state.pending_tick
    }

    /// Number of times the placement engine has run since creation.
    #[cfg(test)]
    pub fn placements(&self) -> u64 {
        self.state.placements
    }

    #[cfg(test)]
    pub fn timezone_receiver_registered(&self) -> bool {
        self.state.timezone_receiver_registered
    }

    fn should_timer_be_running(&self) -> bool {
        self.state.visible && !self.state.ambient
    }

    /// Restart the interactive tick, or stop it if it should not run.
    fn update_timer(&mut self, host: &mut impl FaceHost) {
        if let Some(handle) = self.state.pending_tick.take() {
            host.cancel_tick(handle);
        }
        if self.should_timer_be_running() {
            self.state.pending_tick = Some(host.schedule_tick(Duration::ZERO));
        }
    }

    fn register_receiver(&mut self, host: &mut impl FaceHost) {
        if self.state.timezone_receiver_registered {
            return;
        }
        self.state.timezone_receiver_registered = true;
        host.register_timezone_receiver();
    }

    fn unregister_receiver(&mut self, host: &mut impl FaceHost) {
        if !self.state.timezone_receiver_registered {
            return;
        }
        self.state.timezone_receiver_registered = false;
        host.unregister_timezone_receiver();
    }
}

/// Delay until the next whole minute.
pub fn next_tick_delay(now_millis: i64) -> Duration {
    let delay = INTERACTIVE_UPDATE_RATE_MS - now_millis.rem_euclid(INTERACTIVE_UPDATE_RATE_MS);
    Duration::from_millis(delay as u64)
}
