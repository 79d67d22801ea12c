use super::load_snapshot;

pub fn run(limit: usize, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let history = load_snapshot()?.session_history.unwrap_or_default();
    let shown = &history[..limit.min(history.len())];

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }
    if shown.is_empty() {
        println!("No focus sessions yet.");
        return Ok(());
    }
    for entry in shown {
        let local = entry.completed_at.with_timezone(&chrono::Local);
        let mood = entry.mood.map(|m| m.symbol()).unwrap_or("-");
        println!(
            "{}  {:>5} min  cycle {}/4  {}  {}",
            local.format("%Y-%m-%d %H:%M"),
            entry.focus_minutes,
            entry.cycle,
            mood,
            entry.suggestion.as_deref().unwrap_or(""),
        );
    }
    Ok(())
}
