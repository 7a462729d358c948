/// Host side of the watch face: the services a face consumes and the
/// events the (simulated) platform delivers to it.
pub mod events;
pub mod runtime;
pub mod scheduler;

use chrono::FixedOffset;
use std::time::Duration;

/// Identifies one scheduled tick so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Capabilities a face declares to the host when it is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchFaceStyle {
    pub accepts_tap_events: bool,
    /// The face draws its own unread indicator
    pub hide_notification_indicator: bool,
}

/// Events delivered to the face by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Visibility(bool),
    Ambient(bool),
    TimezoneChanged(FixedOffset),
    UnreadCount(u32),
    /// Platform per-minute tick
    TimeTick,
    TimerFired(TimerHandle),
    Redraw,
    Quit,
}

/// Services the host offers to the face during a callback.
pub trait FaceHost {
    /// Wall clock, milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
    fn default_timezone(&self) -> FixedOffset;
    fn unread_count(&self) -> u32;
    /// Request a redraw after the current callback
    fn invalidate(&mut self);
    fn set_style(&mut self, style: WatchFaceStyle);
    fn schedule_tick(&mut self, delay: Duration) -> TimerHandle;
    fn cancel_tick(&mut self, handle: TimerHandle);
    fn register_timezone_receiver(&mut self);
    fn unregister_timezone_receiver(&mut self);
}
