use breakbuddy_core::stats::{initial_week, week_totals};
use breakbuddy_core::{format_minutes, Clock, SystemClock};
use clap::Subcommand;
use serde_json::json;

use super::load_snapshot;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Per-day focus and break totals for the last seven days
    Week {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Lifetime totals
    Totals {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_snapshot()?;

    match action {
        StatsAction::Week { json } => {
            let week = loaded
                .weekly_stats
                .unwrap_or_else(|| initial_week(SystemClock.today()));
            if json {
                println!("{}", serde_json::to_string_pretty(&week)?);
                return Ok(());
            }
            println!("{:<12} {:>10} {:>6} {:>10} {:>6}", "day", "focus min", "#", "break min", "#");
            for (day, stats) in &week {
                println!(
                    "{:<12} {:>10} {:>6} {:>10} {:>6}",
                    day,
                    format_minutes(stats.focus_seconds),
                    stats.focus_count,
                    format_minutes(stats.break_seconds),
                    stats.break_count,
                );
            }
            let total = week_totals(&week);
            println!(
                "{:<12} {:>10} {:>6} {:>10} {:>6}",
                "total",
                format_minutes(total.focus_seconds),
                total.focus_count,
                format_minutes(total.break_seconds),
                total.break_count,
            );
        }
        StatsAction::Totals { json } => {
            let sessions = loaded.completed_focus_sessions.unwrap_or(0);
            let focus = loaded.total_focus_seconds.unwrap_or(0);
            let rest = loaded.total_break_seconds.unwrap_or(0);
            if json {
                let value = json!({
                    "completedFocusSessions": sessions,
                    "totalFocusSeconds": focus,
                    "totalBreakSeconds": rest,
                    "cycleStreak": loaded.cycle_streak.unwrap_or(0) % 4,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }
            println!("Focus sessions: {sessions}");
            println!("Focus minutes:  {}", format_minutes(focus));
            println!("Break minutes:  {}", format_minutes(rest));
        }
    }
    Ok(())
}
