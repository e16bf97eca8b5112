//! The playback controller. Replays one simulation result on a timer.
//!
//! STATE MACHINE:
//!   Idle ──start──▶ Playing ──(tick reaches max_tick | stop | load)──▶ Idle
//!
//! RULES:
//!   - At most one timer is armed at any moment. `start` while Playing is
//!     a no-op; `start` from Idle cancels any lingering cycle first.
//!   - Each cycle has its own id. A tick carrying any other id is stale
//!     and changes nothing.
//!   - Failed commands leave the result and the clock exactly as they were.
//!   - Entities whose path is shorter than the longest one hold their last
//!     position; the shared clock never stops early for them.

use crate::{
    clock::{PlaybackPhase, PlaybackState},
    command::PlaybackCommand,
    config::PlaybackConfig,
    error::{PlaybackError, PlaybackResult},
    event::PlaybackEvent,
    frame::{visible_logs, EntityLogs, Frame, GeoFrame},
    mapper::CoordinateMapper,
    result::SimulationResult,
    scheduler::{ManualScheduler, TickScheduler},
    summary::FleetSummary,
    types::{CycleId, Tick},
};
use std::time::Duration;

pub struct PlaybackController<S: TickScheduler> {
    config:       PlaybackConfig,
    state:        PlaybackState,
    result:       Option<SimulationResult>,
    scheduler:    S,
    active_cycle: Option<CycleId>,
    next_cycle:   CycleId,
}

impl<S: TickScheduler> PlaybackController<S> {
    pub fn new(config: PlaybackConfig, scheduler: S) -> Self {
        Self {
            config,
            state: PlaybackState::default(),
            result: None,
            scheduler,
            active_cycle: None,
            next_cycle: 1,
        }
    }

    /// Replace the held result. Validation happens before anything is
    /// touched, so a rejected result leaves a running cycle running.
    pub fn load(&mut self, result: SimulationResult) -> PlaybackResult<Vec<PlaybackEvent>> {
        if let Err(e) = result.validate() {
            log::warn!("tick={} playback: rejected result: {e}", self.state.current_tick);
            return Err(e);
        }

        let mut events = Vec::new();
        if self.state.is_playing {
            events.push(PlaybackEvent::PlaybackStopped { tick: self.state.current_tick });
        }
        self.cancel_active();

        let max_tick = result.max_tick();
        let entity_count = result.entity_count();
        self.state = PlaybackState::new(max_tick);
        self.result = Some(result);

        log::info!("playback: loaded {entity_count} taxi(s), max_tick={max_tick}");
        events.push(PlaybackEvent::ResultLoaded { entity_count, max_tick });
        Ok(events)
    }

    /// Begin a play cycle from tick 0.
    pub fn start(&mut self) -> PlaybackResult<Vec<PlaybackEvent>> {
        if self.state.is_playing {
            log::debug!("tick={} playback: start ignored, already playing", self.state.current_tick);
            return Ok(vec![]);
        }
        if self.result.is_none() {
            return Err(PlaybackError::NoResultLoaded);
        }

        self.cancel_active();
        self.state.begin();

        let cycle = self.next_cycle;
        self.next_cycle += 1;
        let max_tick = self.state.max_tick;
        let mut events = vec![PlaybackEvent::PlaybackStarted { cycle, max_tick }];

        // Every path has a single position: tick 0 is already the last frame.
        if self.state.is_complete() {
            self.state.halt();
            log::info!("tick=0 playback: cycle {cycle} finished without ticking");
            events.push(PlaybackEvent::PlaybackFinished { tick: 0 });
            return Ok(events);
        }

        self.scheduler.schedule(cycle, self.config.tick_interval());
        self.active_cycle = Some(cycle);
        log::info!(
            "tick=0 playback: cycle {cycle} started, max_tick={max_tick}, interval={}ms",
            self.config.tick_interval_ms
        );
        Ok(events)
    }

    /// Halt the clock. The current tick stays on display.
    pub fn stop(&mut self) -> Vec<PlaybackEvent> {
        self.cancel_active();
        if !self.state.is_playing {
            return vec![];
        }
        self.state.halt();
        let tick = self.state.current_tick;
        log::info!("tick={tick} playback: stopped");
        vec![PlaybackEvent::PlaybackStopped { tick }]
    }

    /// Timer callback. Advances exactly one tick for the live cycle.
    pub fn on_tick(&mut self, cycle: CycleId) -> Vec<PlaybackEvent> {
        if !self.state.is_playing || self.active_cycle != Some(cycle) {
            log::debug!(
                "tick={} playback: stale tick for cycle {cycle} ignored",
                self.state.current_tick
            );
            return vec![];
        }

        let tick = self.state.advance();
        log::debug!("tick={tick} playback: advanced");
        let mut events = vec![PlaybackEvent::TickAdvanced { tick }];

        if self.state.is_complete() {
            self.cancel_active();
            self.state.halt();
            log::info!("tick={tick} playback: cycle {cycle} finished");
            events.push(PlaybackEvent::PlaybackFinished { tick });
        }
        events
    }

    pub fn apply(&mut self, command: PlaybackCommand) -> PlaybackResult<Vec<PlaybackEvent>> {
        match command {
            PlaybackCommand::Load { result } => self.load(*result),
            PlaybackCommand::Start => self.start(),
            PlaybackCommand::Stop => Ok(self.stop()),
        }
    }

    pub fn current_frame(&self) -> PlaybackResult<Frame> {
        let result = self.loaded()?;
        Ok(Frame::capture(result, &self.state))
    }

    pub fn current_geo_frame(&self, mapper: &CoordinateMapper) -> PlaybackResult<GeoFrame> {
        let result = self.loaded()?;
        Ok(GeoFrame::capture(result, &self.state, mapper))
    }

    /// Decision logs revealed up to the current tick.
    pub fn visible_logs(&self) -> PlaybackResult<Vec<EntityLogs>> {
        let result = self.loaded()?;
        Ok(visible_logs(result, self.state.current_tick))
    }

    pub fn summary(&self) -> PlaybackResult<FleetSummary> {
        Ok(FleetSummary::from_result(self.loaded()?))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase()
    }

    pub fn current_tick(&self) -> Tick {
        self.state.current_tick
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    /// `None` until a result is loaded.
    pub fn max_tick(&self) -> Option<Tick> {
        self.result.as_ref().map(|_| self.state.max_tick)
    }

    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    pub fn active_cycle(&self) -> Option<CycleId> {
        self.active_cycle
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn loaded(&self) -> PlaybackResult<&SimulationResult> {
        self.result.as_ref().ok_or(PlaybackError::NoResultLoaded)
    }

    fn cancel_active(&mut self) {
        if let Some(cycle) = self.active_cycle.take() {
            self.scheduler.cancel(cycle);
        }
    }
}

impl PlaybackController<ManualScheduler> {
    /// Controller on virtual time. Used by tests and offline replays.
    pub fn manual(config: PlaybackConfig) -> Self {
        Self::new(config, ManualScheduler::new())
    }

    /// Move virtual time forward and deliver every tick that fell due.
    pub fn advance_time(&mut self, by: Duration) -> Vec<PlaybackEvent> {
        let due = self.scheduler.advance(by);
        let mut events = Vec::new();
        for cycle in due {
            events.extend(self.on_tick(cycle));
        }
        events
    }

    /// Deliver `n` intervals' worth of ticks.
    pub fn advance_ticks(&mut self, n: u32) -> Vec<PlaybackEvent> {
        self.advance_time(self.config.tick_interval() * n)
    }

    /// Play a full cycle to completion, returning every frame shown
    /// (tick 0 through max_tick).
    pub fn replay_all(&mut self) -> PlaybackResult<Vec<Frame>> {
        self.start()?;
        let mut frames = vec![self.current_frame()?];
        while self.state.is_playing {
            let advanced = self
                .advance_ticks(1)
                .iter()
                .any(|e| matches!(e, PlaybackEvent::TickAdvanced { .. }));
            if advanced {
                frames.push(self.current_frame()?);
            }
        }
        Ok(frames)
    }
}
