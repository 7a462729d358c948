/// Simulated watch-face host. Owns the event loop, timers, invalidation
/// and frame output, and drives the face through its lifecycle callbacks.
use anyhow::{Context, Result};
use chrono::{FixedOffset, Local, Offset, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info};

use crate::config::{FaceConfig, OutputMode};
use crate::face::engine::{WatchFaceEngine, next_tick_delay};
use crate::face::placement::{DrawableArea, PlacementRule};
use crate::host::scheduler::TickScheduler;
use crate::host::{FaceHost, HostEvent, TimerHandle, WatchFaceStyle};
use crate::render::canvas::Canvas;
use crate::render::font::FaceFont;
use crate::render::{Frame, TextMeasurer};

type Clock = Box<dyn Fn() -> i64 + Send>;

/// Host services handed to the face on every callback.
pub struct HostContext {
    clock: Clock,
    scheduler: TickScheduler,
    timezone: FixedOffset,
    unread: u32,
    invalidated: bool,
    style: WatchFaceStyle,
    timezone_receiver: bool,
}

impl HostContext {
    pub fn new(events: mpsc::Sender<HostEvent>, timezone: FixedOffset, unread: u32) -> Self {
        Self {
            clock: Box::new(|| Utc::now().timestamp_millis()),
            scheduler: TickScheduler::new(events),
            timezone,
            unread,
            invalidated: false,
            style: WatchFaceStyle::default(),
            timezone_receiver: false,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[cfg(test)]
    pub fn style(&self) -> WatchFaceStyle {
        self.style
    }

    #[cfg(test)]
    pub fn pending_ticks(&self) -> usize {
        self.scheduler.pending()
    }
}

impl FaceHost for HostContext {
    fn now_millis(&self) -> i64 {
        (self.clock)()
    }

    fn default_timezone(&self) -> FixedOffset {
        self.timezone
    }

    fn unread_count(&self) -> u32 {
        self.unread
    }

    fn invalidate(&mut self) {
        self.invalidated = true;
    }

    fn set_style(&mut self, style: WatchFaceStyle) {
        info!(
            "Face style: taps {}, platform notification indicator {}",
            if style.accepts_tap_events { "accepted" } else { "ignored" },
            if style.hide_notification_indicator { "hidden" } else { "shown" }
        );
        self.style = style;
    }

    fn schedule_tick(&mut self, delay: Duration) -> TimerHandle {
        self.scheduler.schedule(delay)
    }

    fn cancel_tick(&mut self, handle: TimerHandle) {
        self.scheduler.cancel(handle);
    }

    fn register_timezone_receiver(&mut self) {
        debug!("Timezone receiver registered");
        self.timezone_receiver = true;
    }

    fn unregister_timezone_receiver(&mut self) {
        debug!("Timezone receiver unregistered");
        self.timezone_receiver = false;
    }
}

/// One face bound to its host services and a text measurer.
pub struct FaceSession<M> {
    engine: WatchFaceEngine,
    host: HostContext,
    measurer: M,
    area: DrawableArea,
}

impl<M: TextMeasurer> FaceSession<M> {
    pub fn new(engine: WatchFaceEngine, host: HostContext, measurer: M, area: DrawableArea) -> Self {
        Self {
            engine,
            host,
            measurer,
            area,
        }
    }

    /// Create the face and bring it up visible and interactive.
    pub fn start(&mut self) {
        self.engine.on_create(&mut self.host, &self.measurer);
        self.engine.on_visibility_changed(&mut self.host, true);
    }

    pub fn stop(&mut self) {
        self.engine.on_destroy(&mut self.host);
    }

    /// Deliver one host event. Returns false when the session should end.
    pub fn handle_event(&mut self, event: HostEvent) -> bool {
        match event {
            HostEvent::Visibility(visible) => {
                self.engine.on_visibility_changed(&mut self.host, visible);
            }
            HostEvent::Ambient(ambient) => {
                self.engine.on_ambient_mode_changed(&mut self.host, ambient);
            }
            HostEvent::TimezoneChanged(offset) => {
                self.host.timezone = offset;
                if self.host.timezone_receiver {
                    self.engine.on_timezone_changed(&mut self.host);
                } else {
                    debug!("Timezone change to {} not delivered (no receiver)", offset);
                }
            }
            HostEvent::UnreadCount(count) => {
                info!("Unread notifications: {}", count);
                self.host.unread = count;
                self.host.invalidate();
            }
            HostEvent::TimeTick => self.engine.on_time_tick(&mut self.host),
            HostEvent::TimerFired(handle) => {
                if self.host.scheduler.complete(handle) {
                    self.engine.handle_update_time(&mut self.host, handle);
                } else {
                    debug!("Dropping cancelled tick {:?}", handle);
                }
            }
            HostEvent::Redraw => self.host.invalidate(),
            HostEvent::Quit => return false,
        }
        true
    }

    /// Platform minute boundary: ambient faces get their time tick.
    pub fn minute_boundary(&mut self) {
        if self.engine.is_ambient() {
            self.engine.on_time_tick(&mut self.host);
        }
    }

    /// Draw a frame if one was requested and the face is on screen.
    pub fn take_frame(&mut self) -> Option<Frame> {
        if !std::mem::take(&mut self.host.invalidated) || !self.engine.is_visible() {
            return None;
        }
        Some(self.engine.draw(&self.host, &self.measurer, self.area))
    }

    pub fn now_millis(&self) -> i64 {
        self.host.now_millis()
    }

    #[cfg(test)]
    pub fn engine(&self) -> &WatchFaceEngine {
        &self.engine
    }

    #[cfg(test)]
    pub fn host(&self) -> &HostContext {
        &self.host
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }
}

pub struct WatchRuntime {
    config: FaceConfig,
    session: FaceSession<FaceFont>,
    canvas: Canvas,
    events_rx: mpsc::Receiver<HostEvent>,
    events_tx: mpsc::Sender<HostEvent>,
    frames_rendered: u64,
}

impl WatchRuntime {
    pub fn new(config: FaceConfig) -> Result<Self> {
        let font = FaceFont::load(&config.font_path, config.text_size).with_context(|| {
            format!(
                "Failed to load face font {}; pass a TTF/OTF file with --font",
                config.font_path.display()
            )
        })?;
        let canvas = Canvas::new(config.width, config.height, config.shape)?;

        let rule = PlacementRule::new(config.shape)
            .with_clearance(config.min_clearance)
            .with_max_attempts(config.max_attempts);
        let engine = WatchFaceEngine::new(rule, config.dot_anchor, StdRng::from_os_rng());

        let (tx, rx) = mpsc::channel(64);
        let host = HostContext::new(tx.clone(), Local::now().offset().fix(), config.unread);
        let area = DrawableArea::new(config.width, config.height);

        Ok(Self {
            session: FaceSession::new(engine, host, font, area),
            canvas,
            events_rx: rx,
            events_tx: tx,
            frames_rendered: 0,
            config,
        })
    }

    /// Sender for feeding control events into the loop
    pub fn event_sender(&self) -> mpsc::Sender<HostEvent> {
        self.events_tx.clone()
    }

    /// Main event loop
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Starting watch face: {}x{} {:?}, output: {:?}",
            self.config.width, self.config.height, self.config.shape, self.config.output_mode
        );

        self.session.start();
        let result = self.event_loop().await;
        self.session.stop();
        info!("Watch face stopped after {} frame(s)", self.frames_rendered);
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        self.present()?;

        loop {
            let minute = time::sleep(next_tick_delay(self.session.now_millis()));

            tokio::select! {
                event = self.events_rx.recv() => {
                    match event {
                        Some(event) => {
                            if !self.session.handle_event(event) {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = minute => self.session.minute_boundary(),
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            }

            self.present()?;
        }

        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        let Some(frame) = self.session.take_frame() else {
            return Ok(());
        };

        self.canvas.render(&frame, self.session.measurer());
        self.frames_rendered += 1;

        if let Some((text, x, y, style)) = frame.texts().next() {
            info!(
                "Frame {}: '{}' at ({}, {}) {:?}",
                self.frames_rendered, text, x, y, style
            );
        }

        match self.config.output_mode {
            OutputMode::Png => {
                self.canvas
                    .save_png(&self.config.output_path)
                    .context("Failed to save PNG output")?;
                debug!("Saved frame to {}", self.config.output_path.display());
            }
            OutputMode::Raw => {
                let mut stdout = std::io::stdout();
                stdout.write_all(self.canvas.pixels())?;
                stdout.flush()?;
            }
            OutputMode::None => {}
        }
        Ok(())
    }
}
