use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod ordering;
mod timers;

#[derive(Parser)]
#[command(name = "tickloop")]
#[command(about = "Cooperative scheduler demos", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the sync / microtask / timer / immediate ordering program
    Ordering {
        /// Log task failures and keep draining instead of stopping
        #[arg(long)]
        continue_on_failure: bool,
    },
    /// Schedule one timer per delay and report the order they fire in
    Timers {
        /// Comma-separated delays in milliseconds
        #[arg(long, value_delimiter = ',', default_values_t = [30, 0, 10, 20])]
        delays: Vec<u64>,
        /// Sleep on the wall clock instead of jumping logical time
        #[arg(long)]
        realtime: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match &cli.command {
        Commands::Ordering { continue_on_failure } => {
            let observed = ordering::run(*continue_on_failure)?;
            println!("{}", ordering::render(&observed));
            if observed != ordering::EXPECTED {
                bail!(
                    "unexpected ordering, wanted {}",
                    ordering::render(&ordering::EXPECTED)
                );
            }
        }
        Commands::Timers { delays, realtime } => {
            for firing in timers::run(delays, *realtime)? {
                println!(
                    "{:>6}ms timer fired at {:?}",
                    firing.delay.as_millis(),
                    firing.fired_at
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
