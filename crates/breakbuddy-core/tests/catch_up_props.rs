//! Property tests: ticking through arbitrary elapsed time lands where a
//! straightforward phase-by-phase simulation says it should.

use std::sync::Arc;

use breakbuddy_core::clock::{Clock, ManualClock};
use breakbuddy_core::state::EngineState;
use breakbuddy_core::timer::{Durations, Phase, TimerEngine};
use proptest::prelude::*;

const START_MS: i64 = 1_700_000_000_000;

#[derive(Debug, PartialEq)]
struct Expected {
    phase: Phase,
    seconds_remaining: u64,
    gated: bool,
    focus_completions: u64,
}

fn simulate(d: Durations, elapsed_secs: u64) -> Expected {
    let mut t = elapsed_secs;
    let mut phase = Phase::Focus;
    let mut streak = 0;
    let mut focus_completions = 0;
    loop {
        let len = d.for_phase(phase);
        if t < len {
            return Expected {
                phase,
                seconds_remaining: len - t,
                gated: false,
                focus_completions,
            };
        }
        t -= len;
        if phase == Phase::Focus {
            focus_completions += 1;
            streak += 1;
            if streak == 4 {
                return Expected {
                    phase: Phase::LongBreak,
                    seconds_remaining: d.long_break,
                    gated: true,
                    focus_completions,
                };
            }
            phase = Phase::ShortBreak;
        } else {
            phase = Phase::Focus;
        }
    }
}

fn observe(engine: &TimerEngine) -> Expected {
    let s = engine.state();
    Expected {
        phase: s.timer.phase,
        seconds_remaining: s.timer.seconds_remaining,
        gated: s.show_break_gate,
        focus_completions: s.session_history.len() as u64,
    }
}

fn durations() -> impl Strategy<Value = Durations> {
    (1u64..=600, 1u64..=300, 1u64..=900).prop_map(|(focus, short_break, long_break)| Durations {
        focus,
        short_break,
        long_break,
    })
}

fn engine_for(d: Durations) -> (TimerEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    let state = EngineState::initial(d, clock.today());
    let mut engine = TimerEngine::new(state, clock.clone());
    engine.start();
    (engine, clock)
}

proptest! {
    #[test]
    fn single_jump_matches_simulation(d in durations(), elapsed in 0u64..5_000) {
        let (mut engine, clock) = engine_for(d);
        clock.advance_secs(elapsed as i64);
        engine.tick();
        prop_assert_eq!(observe(&engine), simulate(d, elapsed));
    }

    #[test]
    fn stepped_ticks_match_simulation(
        d in durations(),
        steps in prop::collection::vec(0u64..700, 1..20),
    ) {
        let (mut engine, clock) = engine_for(d);
        for step in &steps {
            clock.advance_secs(*step as i64);
            engine.tick();
        }
        let total: u64 = steps.iter().sum();
        prop_assert_eq!(observe(&engine), simulate(d, total));
    }

    #[test]
    fn running_countdown_tracks_target(d in durations(), elapsed_ms in 0i64..3_000_000) {
        let (mut engine, clock) = engine_for(d);
        clock.advance_ms(elapsed_ms);
        engine.tick();
        let s = engine.state();
        if s.timer.is_running {
            let target = s.timer.target_timestamp.expect("running timer has a target");
            let remaining = target - clock.now_ms();
            prop_assert!(remaining > 0);
            prop_assert_eq!(s.timer.seconds_remaining, ((remaining + 999) / 1000) as u64);
        } else {
            prop_assert!(s.show_break_gate);
            prop_assert!(s.timer.target_timestamp.is_none());
        }
    }

    #[test]
    fn streak_stays_below_cycle_length(d in durations(), elapsed in 0u64..20_000) {
        let (mut engine, clock) = engine_for(d);
        clock.advance_secs(elapsed as i64);
        engine.tick();
        prop_assert!(engine.state().cycle_streak < 4);
    }
}
