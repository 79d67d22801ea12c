use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "breakbuddy", version, about = "BreakBuddy focus timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live focus timer in the terminal
    Run,
    /// Weekly statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Recent focus sessions
    History {
        /// Number of entries to show
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Brew a one-off break suggestion
    Suggest {
        /// Focus minutes to mention in the prompt
        #[arg(long, default_value = "25")]
        minutes: u32,
        /// Mood symbol or name (e.g. "sleepy", "🧠")
        #[arg(long)]
        mood: Option<String>,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("breakbuddy=info,breakbuddy_core=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run => commands::run::run(),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::History { limit, json } => commands::history::run(limit, json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Suggest { minutes, mood } => commands::suggest::run(minutes, mood.as_deref()),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "breakbuddy", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
