//! End-to-end cycle scenarios through the `FocusTimer` facade.

use std::sync::Arc;

use async_trait::async_trait;
use breakbuddy_core::clock::ManualClock;
use breakbuddy_core::error::GenerationError;
use breakbuddy_core::storage::MemorySnapshotStore;
use breakbuddy_core::suggestion::{StaticGenerator, SuggestionGenerator, SuggestionRequest};
use breakbuddy_core::timer::{Durations, DurationsUpdate, Phase};
use breakbuddy_core::{Event, FocusTimer, Mood};
use tokio::sync::Notify;

fn timer(clock: &Arc<ManualClock>) -> FocusTimer {
    FocusTimer::builder()
        .clock(clock.clone())
        .generator(Arc::new(StaticGenerator::new("Stretch like a cat.")))
        .build()
}

#[tokio::test]
async fn one_focus_sprint_in_a_single_jump() {
    let clock = Arc::new(ManualClock::starting_now());
    let timer = timer(&clock);
    let mut events = timer.events();

    timer.start();
    clock.advance_secs(1500);
    timer.tick_now();

    let s = timer.state();
    assert_eq!(s.timer.phase, Phase::ShortBreak);
    assert_eq!(s.timer.seconds_remaining, 300);
    assert_eq!(s.session_history.len(), 1);
    assert_eq!(s.total_focus_seconds, 1500);
    assert_eq!(s.completed_focus_sessions, 1);

    let today = breakbuddy_core::stats::day_key(clock_today(&clock));
    assert_eq!(s.weekly_stats[&today].focus_count, 1);
    assert_eq!(s.weekly_stats[&today].focus_seconds, 1500);

    assert!(matches!(events.try_recv(), Ok(Event::TimerStarted { .. })));
    assert!(matches!(
        events.try_recv(),
        Ok(Event::PhaseCompleted { phase: Phase::Focus, session_id: Some(_), .. })
    ));
    timer.reset();
}

fn clock_today(clock: &ManualClock) -> chrono::NaiveDate {
    use breakbuddy_core::clock::Clock;
    clock.today()
}

#[tokio::test]
async fn four_sprints_raise_the_gate() {
    let clock = Arc::new(ManualClock::starting_now());
    let timer = timer(&clock);
    timer.start();
    for _ in 0..3 {
        clock.advance_secs(1500);
        timer.tick_now();
        clock.advance_secs(300);
        timer.tick_now();
    }
    assert_eq!(timer.state().cycle_streak, 3);
    clock.advance_secs(1500);
    let events = timer.tick_now();

    let s = timer.state();
    assert!(events.iter().any(Event::is_gate_raised));
    assert!(s.show_break_gate);
    assert_eq!(s.timer.phase, Phase::LongBreak);
    assert_eq!(s.cycle_streak, 0);
    assert!(!s.timer.is_running);
    assert!(!timer.is_ticking());
    assert_eq!(s.cycle_index(), 4);

    // Cycle positions recorded in history, newest first.
    let cycles: Vec<u32> = s.session_history.iter().map(|e| e.cycle).collect();
    assert_eq!(cycles, vec![4, 3, 2, 1]);

    timer.skip_break_gate();
    let s = timer.state();
    assert!(!s.show_break_gate);
    assert_eq!(s.timer.phase, Phase::Focus);
    assert_eq!(s.cycle_streak, 0);
    assert!(s.timer.is_running);
    timer.reset();
}

#[tokio::test]
async fn disabling_auto_brew_drops_queued_suggestion() {
    let clock = Arc::new(ManualClock::starting_now());
    let timer = timer(&clock);
    timer.start();
    clock.advance_secs(1500);
    timer.tick_now();
    timer.pause();

    timer.prefetch_auto_suggestion().await;
    assert_eq!(
        timer.state().suggestion.queued_suggestion.as_deref(),
        Some("Stretch like a cat.")
    );

    timer.set_auto_brew_enabled(false);
    let s = timer.state().suggestion;
    assert!(s.queued_suggestion.is_none());
    assert!(!s.auto_brew_enabled);

    // No prefetch while disabled.
    timer.prefetch_auto_suggestion().await;
    assert!(timer.state().suggestion.queued_suggestion.is_none());
}

#[tokio::test]
async fn applying_queued_suggestion_attaches_it_once() {
    let clock = Arc::new(ManualClock::starting_now());
    let timer = timer(&clock);
    timer.set_mood(Mood::Spicy);
    timer.start();
    clock.advance_secs(1500);
    timer.tick_now();
    timer.pause();

    timer.prefetch_auto_suggestion().await;
    timer.trigger_auto_prompt();
    assert!(timer.state().suggestion.auto_prompt_visible);
    timer.apply_queued_suggestion();

    let s = timer.state();
    assert_eq!(s.suggestion.break_suggestion.as_deref(), Some("Stretch like a cat."));
    assert!(!s.suggestion.auto_prompt_visible);
    assert!(!s.suggestion.focus_session_complete);
    assert_eq!(s.suggestion.session_count, 1);
    assert_eq!(s.pending_break_suggestions, 0);
    assert_eq!(s.session_history[0].mood, Some(Mood::Spicy));
    assert_eq!(
        s.session_history[0].suggestion.as_deref(),
        Some("Stretch like a cat.")
    );

    // A later manual brew does not overwrite the attached text.
    timer.generate_break_suggestion().await;
    assert_eq!(
        timer.state().session_history[0].suggestion.as_deref(),
        Some("Stretch like a cat.")
    );
}

/// Generator that blocks until released, to interleave completions.
struct Gated {
    release: Notify,
}

#[async_trait]
impl SuggestionGenerator for Gated {
    async fn generate(&self, _request: &SuggestionRequest) -> Result<String, GenerationError> {
        self.release.notified().await;
        Ok("stale".into())
    }
}

#[tokio::test]
async fn stale_prefetch_is_discarded() {
    let clock = Arc::new(ManualClock::starting_now());
    let generator = Arc::new(Gated {
        release: Notify::new(),
    });
    let timer = FocusTimer::builder()
        .clock(clock.clone())
        .durations(Durations {
            focus: 60,
            short_break: 30,
            long_break: 90,
        })
        .generator(generator.clone())
        .build();
    timer.start();
    clock.advance_secs(60);
    timer.tick_now();

    let pending = {
        let timer = timer.clone();
        tokio::spawn(async move { timer.prefetch_auto_suggestion().await })
    };
    tokio::task::yield_now().await;
    assert!(timer.state().suggestion.is_prefetching);

    // Break ends and the next focus completes while the fetch is in flight.
    clock.advance_secs(30 + 60);
    timer.tick_now();
    assert!(timer.state().suggestion.focus_session_complete);

    generator.release.notify_one();
    pending.await.unwrap();
    let s = timer.state().suggestion;
    assert!(s.queued_suggestion.is_none());
    assert!(s.auto_suggestion_error.is_none());
    timer.reset();
}

#[tokio::test]
async fn reset_discards_in_flight_manual_brew() {
    let clock = Arc::new(ManualClock::starting_now());
    let generator = Arc::new(Gated {
        release: Notify::new(),
    });
    let timer = FocusTimer::builder()
        .clock(clock.clone())
        .generator(generator.clone())
        .build();

    let pending = {
        let timer = timer.clone();
        tokio::spawn(async move { timer.generate_break_suggestion().await })
    };
    tokio::task::yield_now().await;
    assert!(timer.state().suggestion.is_generating);

    timer.reset();
    generator.release.notify_one();
    pending.await.unwrap();
    let s = timer.state().suggestion;
    assert!(s.break_suggestion.is_none());
    assert!(!s.is_generating);
}

#[tokio::test]
async fn failed_brew_sets_error_without_retry() {
    struct Failing;

    #[async_trait]
    impl SuggestionGenerator for Failing {
        async fn generate(&self, _r: &SuggestionRequest) -> Result<String, GenerationError> {
            Err(GenerationError::TokenLimit)
        }
    }

    let clock = Arc::new(ManualClock::starting_now());
    let timer = FocusTimer::builder()
        .clock(clock)
        .generator(Arc::new(Failing))
        .build();
    timer.generate_break_suggestion().await;
    let s = timer.state().suggestion;
    assert!(!s.is_generating);
    assert!(s.break_suggestion.is_none());
    assert!(s
        .suggestion_error
        .as_deref()
        .is_some_and(|e| e.contains("token cap")));

    timer.clear_break_suggestion();
    assert!(timer.state().suggestion.suggestion_error.is_none());
}

#[tokio::test]
async fn durations_edit_while_idle_updates_countdown() {
    let clock = Arc::new(ManualClock::starting_now());
    let store = Arc::new(MemorySnapshotStore::new());
    let timer = FocusTimer::builder()
        .clock(clock)
        .store(store.clone())
        .build();
    timer.set_durations(DurationsUpdate {
        focus: Some(45 * 60),
        short_break: Some(0),
        ..Default::default()
    });
    let s = timer.state();
    assert_eq!(s.timer.seconds_remaining, 2700);
    assert_eq!(s.durations.short_break, 300);
    assert!(store.raw().unwrap().contains("\"focus\":2700"));
}
