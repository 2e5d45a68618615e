use anyhow::Result;
use boarding_cli::OutputFormat;
use boarding_cli::commands::{self, config::Overrides};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "boarding")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "End-to-end checks for an airline booking flow",
    long_about = "Boarding drives Chrome through a live booking journey (search, fare, passengers, \
                  seats, extras) and checks what the page shows at every stage."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct FlowArgs {
    /// JSON flow configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Booking site start page
    #[arg(long, env = "BOARDING_URL")]
    url: Option<String>,

    /// Path to the Chrome or Chromium binary
    #[arg(long, env = "BOARDING_CHROME", value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Seconds to wait for any page condition
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl FlowArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            chrome_path: self.chrome_path.clone(),
            headed: self.headed,
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the booking flow against the live site
    Run {
        #[command(flatten)]
        flow: FlowArgs,

        /// Named persistent profile (~/.boarding/profiles/NAME); temporary if omitted
        #[arg(long)]
        profile: Option<String>,
    },

    /// Show the effective flow configuration
    Config {
        #[command(flatten)]
        flow: FlowArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Generate shell completion scripts
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { flow, profile } => {
            let config = commands::config::resolve(flow.config.as_deref(), &flow.overrides())?;
            commands::run::execute(config, profile)
        }
        Commands::Config { flow, format } => {
            commands::config::execute(flow.config.as_deref(), &flow.overrides(), format)
        }
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command(), &mut std::io::stdout())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("boarding_cli=debug,boarding_core=debug,boarding_browser=debug")
    } else {
        EnvFilter::new("boarding_cli=info,boarding_browser=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
