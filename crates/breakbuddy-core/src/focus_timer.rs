//! The public engine facade.
//!
//! `FocusTimer` is a cheap-to-clone handle over one [`TimerEngine`]. It
//! owns the tick task, publishes every state change on a `watch` channel,
//! writes the durable snapshot when it changes and fires best-effort
//! notifications. Generation calls run with no lock held; their results
//! are re-validated by the engine before they are applied.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::events::Event;
use crate::notify::{self, NoopNotifier, Notifier, SoundCue};
use crate::state::EngineState;
use crate::stats::Mood;
use crate::storage::{Config, MemorySnapshotStore, PersistedSnapshot, SnapshotStore};
use crate::suggestion::{StaticGenerator, SuggestionGenerator};
use crate::timer::{
    Durations, DurationsUpdate, TickOutcome, TickReport, Ticker, TimerEngine, DEFAULT_MAX_CATCH_UP,
};

const EVENT_CAPACITY: usize = 64;

struct Core {
    engine: TimerEngine,
    persisted: Option<PersistedSnapshot>,
}

struct Shared {
    core: Mutex<Core>,
    ticker: Mutex<Ticker>,
    state_tx: watch::Sender<EngineState>,
    event_tx: broadcast::Sender<Event>,
    store: Arc<dyn SnapshotStore>,
    generator: Arc<dyn SuggestionGenerator>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    sound_enabled: bool,
    notifications_enabled: bool,
}

impl Shared {
    fn lock_core(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_ticker(&self) -> MutexGuard<'_, Ticker> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the engine, then publish and persist the result.
    fn mutate<R>(&self, f: impl FnOnce(&mut TimerEngine) -> R) -> R {
        let mut core = self.lock_core();
        let out = f(&mut core.engine);
        self.commit(&mut core);
        out
    }

    fn commit(&self, core: &mut Core) {
        let state = core.engine.state();
        self.state_tx.send_if_modified(|current| {
            if *current == *state {
                false
            } else {
                *current = state.clone();
                true
            }
        });

        let snapshot = state.persisted();
        if core.persisted.as_ref() == Some(&snapshot) {
            return;
        }
        match self.store.save(&snapshot) {
            Ok(()) => core.persisted = Some(snapshot),
            Err(e) => warn!(error = %e, "failed to persist snapshot"),
        }
    }

    fn emit(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            // No receivers is fine.
            let _ = self.event_tx.send(event);
        }
    }

    fn tick(&self) -> TickReport {
        let report = self.mutate(TimerEngine::tick);
        self.emit(report.events.iter().cloned());
        report
    }

    fn ensure_ticking(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.lock_ticker().start(self.tick_interval, move || {
            let Some(shared) = weak.upgrade() else {
                return TickOutcome::Stop;
            };
            if shared.tick().keep_ticking {
                TickOutcome::Continue
            } else {
                TickOutcome::Stop
            }
        });
    }

    fn stop_ticking(&self) {
        self.lock_ticker().stop();
    }

    fn play(&self, cue: SoundCue) {
        if self.sound_enabled {
            notify::play(self.notifier.as_ref(), cue);
        }
    }

    fn send(&self, title: &str, body: &str) {
        if self.notifications_enabled {
            notify::send(self.notifier.as_ref(), title, body);
        }
    }
}

/// Builds a [`FocusTimer`]. Every collaborator has an offline default.
pub struct FocusTimerBuilder {
    durations: Durations,
    clock: Arc<dyn Clock>,
    store: Arc<dyn SnapshotStore>,
    generator: Arc<dyn SuggestionGenerator>,
    notifier: Arc<dyn Notifier>,
    tick_interval: Duration,
    max_catch_up: u32,
    sound_enabled: bool,
    notifications_enabled: bool,
}

impl Default for FocusTimerBuilder {
    fn default() -> Self {
        Self {
            durations: Durations::default(),
            clock: Arc::new(SystemClock),
            store: Arc::new(MemorySnapshotStore::new()),
            generator: Arc::new(StaticGenerator::new("Stand up, stretch, and look at something far away.")),
            notifier: Arc::new(NoopNotifier),
            tick_interval: Duration::from_millis(250),
            max_catch_up: DEFAULT_MAX_CATCH_UP,
            sound_enabled: true,
            notifications_enabled: true,
        }
    }
}

impl FocusTimerBuilder {
    /// Apply durations, engine tuning and notification switches from config.
    pub fn config(mut self, cfg: &Config) -> Self {
        self.durations = cfg.durations();
        self.tick_interval = Duration::from_millis(cfg.engine.tick_interval_ms.max(1));
        self.max_catch_up = cfg.engine.max_catch_up_iterations.max(1);
        self.sound_enabled = cfg.notifications.sound;
        self.notifications_enabled = cfg.notifications.enabled;
        self
    }

    /// Defaults used when the stored snapshot has no durations.
    pub fn durations(mut self, durations: Durations) -> Self {
        self.durations = durations;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = store;
        self
    }

    pub fn generator(mut self, generator: Arc<dyn SuggestionGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn max_catch_up(mut self, max: u32) -> Self {
        self.max_catch_up = max.max(1);
        self
    }

    /// Load the stored snapshot, seed the engine and write the snapshot back.
    pub fn build(self) -> FocusTimer {
        let today = self.clock.today();
        let loaded = self.store.load(today);
        let state = EngineState::from_loaded(self.durations, loaded, today);
        let engine = TimerEngine::new(state.clone(), self.clock.clone())
            .with_max_catch_up(self.max_catch_up);

        let (state_tx, _) = watch::channel(state);
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let shared = Arc::new(Shared {
            core: Mutex::new(Core {
                engine,
                persisted: None,
            }),
            ticker: Mutex::new(Ticker::new()),
            state_tx,
            event_tx,
            store: self.store,
            generator: self.generator,
            notifier: self.notifier,
            clock: self.clock,
            tick_interval: self.tick_interval,
            sound_enabled: self.sound_enabled,
            notifications_enabled: self.notifications_enabled,
        });
        {
            let mut core = shared.lock_core();
            shared.commit(&mut core);
        }
        FocusTimer { shared }
    }
}

/// Handle to a running focus/break engine.
#[derive(Clone)]
pub struct FocusTimer {
    shared: Arc<Shared>,
}

impl FocusTimer {
    pub fn builder() -> FocusTimerBuilder {
        FocusTimerBuilder::default()
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Current state snapshot.
    pub fn state(&self) -> EngineState {
        self.shared.state_tx.borrow().clone()
    }

    /// Receiver that sees every published state change.
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.shared.state_tx.subscribe()
    }

    /// Receiver for one-shot events (completions, gate decisions).
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.event_tx.subscribe()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.shared.clock.clone()
    }

    /// Whether a tick task is live.
    pub fn is_ticking(&self) -> bool {
        self.shared.lock_ticker().is_active()
    }

    /// Run one tick immediately, outside the periodic task.
    pub fn tick_now(&self) -> Vec<Event> {
        let report = self.shared.tick();
        if !report.keep_ticking {
            self.shared.stop_ticking();
        }
        report.events
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start(&self) {
        let event = self.shared.mutate(TimerEngine::start);
        if let Some(event) = event {
            self.shared.emit([event]);
            self.shared.ensure_ticking();
        }
    }

    pub fn pause(&self) {
        let event = self.shared.mutate(TimerEngine::pause);
        if let Some(event) = event {
            self.shared.stop_ticking();
            self.shared.emit([event]);
        }
    }

    pub fn resume(&self) {
        let event = self.shared.mutate(TimerEngine::resume);
        if let Some(event) = event {
            self.shared.emit([event]);
            self.shared.ensure_ticking();
        }
    }

    pub fn reset(&self) {
        self.shared.stop_ticking();
        let event = self.shared.mutate(TimerEngine::reset);
        self.shared.emit(event);
    }

    pub fn set_durations(&self, update: DurationsUpdate) {
        self.shared.mutate(|e| e.set_durations(update));
    }

    pub fn set_mood(&self, mood: Mood) {
        self.shared.mutate(|e| e.set_mood(mood));
    }

    pub fn clear_mood(&self) {
        self.shared.mutate(TimerEngine::clear_mood);
    }

    // ── Break gate ───────────────────────────────────────────────────

    pub fn accept_break_gate(&self) {
        let Some(event) = self.shared.mutate(TimerEngine::accept_break_gate) else {
            debug!("accept ignored: no gate pending");
            return;
        };
        self.shared.emit([event]);
        self.shared.play(SoundCue::LongBreakStart);
        self.shared.send(
            "BreakBuddy ☕",
            "Long break engaged. Hydrate before your keyboard unionizes.",
        );
        self.shared.ensure_ticking();
    }

    pub fn skip_break_gate(&self) {
        let Some(event) = self.shared.mutate(TimerEngine::skip_break_gate) else {
            debug!("skip ignored: no gate pending");
            return;
        };
        self.shared.emit([event]);
        self.shared.send(
            "BreakBuddy 😒",
            "Skipping the long break? Fine. Stretch later, if your neck survives.",
        );
        self.shared.ensure_ticking();
    }

    // ── Suggestions ──────────────────────────────────────────────────

    /// Manual brew. Errors land in `suggestion_error`.
    pub async fn generate_break_suggestion(&self) {
        if let Some(task) = self.begin_manual_task() {
            task.await;
        }
    }

    fn begin_manual_task(&self) -> Option<impl Future<Output = ()> + Send + 'static> {
        let ticket = self.shared.mutate(TimerEngine::begin_manual_suggestion)?;
        let shared = self.shared.clone();
        Some(async move {
            let outcome = shared.generator.generate(&ticket.request).await;
            if let Err(e) = &outcome {
                warn!(error = %e, "break suggestion failed");
            }
            shared.mutate(|e| e.finish_manual_suggestion(ticket, outcome));
        })
    }

    /// Start a manual brew on the runtime and return immediately.
    pub fn spawn_break_suggestion(&self) -> bool {
        match self.begin_manual_task() {
            Some(task) => {
                tokio::spawn(task);
                true
            }
            None => false,
        }
    }

    /// Prefetch an auto suggestion if eligible. Errors land in
    /// `auto_suggestion_error`.
    pub async fn prefetch_auto_suggestion(&self) {
        if let Some(task) = self.begin_prefetch_task() {
            task.await;
        }
    }

    fn begin_prefetch_task(&self) -> Option<impl Future<Output = ()> + Send + 'static> {
        let ticket = self.shared.mutate(TimerEngine::begin_prefetch)?;
        let shared = self.shared.clone();
        Some(async move {
            let outcome = shared.generator.generate(&ticket.request).await;
            if let Err(e) = &outcome {
                warn!(error = %e, "auto suggestion prefetch failed");
            }
            shared.mutate(|e| e.finish_prefetch(ticket, outcome));
        })
    }

    /// Start a prefetch on the runtime if eligible.
    pub fn spawn_prefetch(&self) -> bool {
        match self.begin_prefetch_task() {
            Some(task) => {
                tokio::spawn(task);
                true
            }
            None => false,
        }
    }

    pub fn clear_break_suggestion(&self) {
        self.shared.mutate(TimerEngine::clear_break_suggestion);
    }

    pub fn trigger_auto_prompt(&self) {
        if self.shared.mutate(TimerEngine::trigger_auto_prompt) {
            self.shared.send(
                "Focus done ☕",
                "Time to chill? BreakBuddy brewed a suggestion for you.",
            );
        }
    }

    pub fn apply_queued_suggestion(&self) {
        self.shared.mutate(TimerEngine::apply_queued_suggestion);
    }

    pub fn abort_auto_suggestion(&self) {
        self.shared.mutate(TimerEngine::abort_auto_suggestion);
    }

    pub fn snooze_auto_suggestion(&self, minutes: u32) {
        self.shared.mutate(|e| e.snooze_auto_suggestion(minutes));
    }

    pub fn resume_awaiting_break(&self) {
        self.shared.mutate(TimerEngine::resume_awaiting_break);
    }

    pub fn set_auto_brew_enabled(&self, enabled: bool) {
        self.shared.mutate(|e| e.set_auto_brew_enabled(enabled));
    }
}
