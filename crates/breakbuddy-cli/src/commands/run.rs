use std::sync::Arc;
use std::time::Duration;

use breakbuddy_core::storage::SqliteSnapshotStore;
use breakbuddy_core::{
    AutoBrewDriver, Config, EngineState, Event, FocusTimer, GeminiClient, LogNotifier, Mood,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

const HELP: &str = "commands: s start | p pause | r resume | x reset | b brew | a accept gate | \
k skip gate | q apply queued | z snooze | m <mood> | m clear | auto on|off | ? status | quit";

/// One line of terminal input.
#[derive(Debug, PartialEq)]
enum Input {
    Start,
    Pause,
    Resume,
    Reset,
    Brew,
    Accept,
    Skip,
    ApplyQueued,
    Snooze,
    Mood(Mood),
    ClearMood,
    AutoBrew(bool),
    Status,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let input = match cmd {
        "s" | "start" => Input::Start,
        "p" | "pause" => Input::Pause,
        "r" | "resume" => Input::Resume,
        "x" | "reset" => Input::Reset,
        "b" | "brew" => Input::Brew,
        "a" | "accept" => Input::Accept,
        "k" | "skip" => Input::Skip,
        "q" | "apply" => Input::ApplyQueued,
        "z" | "snooze" => Input::Snooze,
        "m" | "mood" if rest == "clear" || rest.is_empty() => Input::ClearMood,
        "m" | "mood" => Input::Mood(rest.parse()?),
        "auto" => match rest {
            "on" => Input::AutoBrew(true),
            "off" => Input::AutoBrew(false),
            other => return Err(format!("expected on or off, got {other:?}")),
        },
        "?" | "status" => Input::Status,
        "quit" | "exit" => Input::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(input)
}

fn status_line(state: &EngineState) -> String {
    let secs = state.timer.seconds_remaining;
    let mut line = format!(
        "[{} {}/4] {:02}:{:02} {}",
        state.timer.phase.label(),
        state.cycle_index(),
        secs / 60,
        secs % 60,
        if state.timer.is_running { "running" } else { "paused" },
    );
    if state.show_break_gate {
        line.push_str("  (long break due: a accept, k skip)");
    }
    line
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::PhaseCompleted { phase, .. } => Some(format!("{} complete", phase.label())),
        Event::PhaseStarted { phase, duration_secs, .. } => Some(format!(
            "{} started ({} min)",
            phase.label(),
            breakbuddy_core::format_minutes(*duration_secs)
        )),
        Event::BreakGateRaised { .. } => {
            Some("Four sprints done. Take the long break? (a accept, k skip)".into())
        }
        _ => None,
    }
}

/// Print suggestion changes between two snapshots.
fn report_suggestion(prev: &EngineState, next: &EngineState) {
    let (p, n) = (&prev.suggestion, &next.suggestion);
    if n.break_suggestion != p.break_suggestion {
        if let Some(text) = &n.break_suggestion {
            println!("☕ {text}");
        }
    }
    if n.suggestion_error != p.suggestion_error {
        if let Some(err) = &n.suggestion_error {
            println!("brew failed: {err}");
        }
    }
    if n.auto_prompt_visible && !p.auto_prompt_visible {
        match &n.queued_suggestion {
            Some(text) => println!("Time to chill? \"{text}\" (q apply, z snooze)"),
            None => println!("Time to chill? (b brew, z snooze)"),
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_loop())
}

async fn run_loop() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = Arc::new(SqliteSnapshotStore::open()?);
    let timer = FocusTimer::builder()
        .config(&config)
        .store(store)
        .generator(Arc::new(GeminiClient::from_config(&config.suggestions)))
        .notifier(Arc::new(LogNotifier))
        .build();
    let idle = Duration::from_secs(config.suggestions.idle_prompt_secs);
    let auto = AutoBrewDriver::new(timer.clone(), idle).spawn();
    let snooze_minutes = config.suggestions.snooze_minutes;

    let mut events = timer.events();
    let mut states = timer.subscribe();
    let mut last = states.borrow_and_update().clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    println!("{}", status_line(&last));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                auto.user_activity();
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Status) => println!("{}", status_line(&timer.state())),
                    Ok(input) => apply(&timer, input, snooze_minutes),
                    Err(e) => println!("{e}\n{HELP}"),
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(text) = describe(&event) {
                        println!("{text}");
                    }
                }
                Err(RecvError::Lagged(n)) => info!(skipped = n, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = states.borrow_and_update().clone();
                report_suggestion(&last, &next);
                last = next;
            }
        }
    }

    auto.stop();
    timer.pause();
    println!("{}", status_line(&timer.state()));
    Ok(())
}

fn apply(timer: &FocusTimer, input: Input, snooze_minutes: u32) {
    let brewing = input == Input::Brew;
    match input {
        Input::Start => timer.start(),
        Input::Pause => timer.pause(),
        Input::Resume => timer.resume(),
        Input::Reset => timer.reset(),
        Input::Brew => {
            if !timer.spawn_break_suggestion() {
                println!("already brewing");
            }
        }
        Input::Accept => timer.accept_break_gate(),
        Input::Skip => timer.skip_break_gate(),
        Input::ApplyQueued => timer.apply_queued_suggestion(),
        Input::Snooze => timer.snooze_auto_suggestion(snooze_minutes),
        Input::Mood(mood) => timer.set_mood(mood),
        Input::ClearMood => timer.clear_mood(),
        Input::AutoBrew(enabled) => timer.set_auto_brew_enabled(enabled),
        Input::Status | Input::Quit => {}
    }
    if !brewing {
        println!("{}", status_line(&timer.state()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_letter_commands() {
        assert_eq!(parse_input("s").unwrap(), Input::Start);
        assert_eq!(parse_input(" p ").unwrap(), Input::Pause);
        assert_eq!(parse_input("k").unwrap(), Input::Skip);
        assert_eq!(parse_input("q").unwrap(), Input::ApplyQueued);
        assert_eq!(parse_input("quit").unwrap(), Input::Quit);
    }

    #[test]
    fn parses_mood_by_symbol_or_name() {
        assert_eq!(parse_input("m 😴").unwrap(), Input::Mood(Mood::Sleepy));
        assert_eq!(parse_input("m sleepy").unwrap(), Input::Mood(Mood::Sleepy));
        assert_eq!(parse_input("m clear").unwrap(), Input::ClearMood);
        assert!(parse_input("m grumpy").is_err());
    }

    #[test]
    fn parses_auto_toggle() {
        assert_eq!(parse_input("auto off").unwrap(), Input::AutoBrew(false));
        assert!(parse_input("auto maybe").is_err());
        assert!(parse_input("dance").is_err());
    }

    #[test]
    fn status_line_shows_countdown() {
        let state = EngineState::initial(
            breakbuddy_core::Durations::default(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        );
        let line = status_line(&state);
        assert!(line.contains("25:00"), "{line}");
        assert!(line.contains("1/4"), "{line}");
    }
}
