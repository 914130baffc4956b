use clap::{Parser, ValueEnum};
use ledger_actor::application::simulation::Simulation;
use ledger_actor::config::{self, SimulationConfig};
use ledger_actor::interfaces::csv::balance_writer::BalanceWriter;
use ledger_actor::logging::init_logging;
use miette::{IntoDiagnostic, Result, miette};
use std::fs::File;
use std::path::PathBuf;

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of accounts in the ledger
    #[arg(long, default_value_t = config::DEFAULT_ACCOUNTS)]
    accounts: usize,

    /// Number of concurrent producers, each trying to land one transfer
    #[arg(long, default_value_t = config::DEFAULT_OPERATIONS)]
    operations: usize,

    /// Starting balance of every account
    #[arg(long, default_value_t = config::DEFAULT_INITIAL_BALANCE)]
    initial_balance: i64,

    /// Smallest transfer amount (inclusive)
    #[arg(long, default_value_t = config::DEFAULT_MIN_AMOUNT, allow_negative_numbers = true)]
    min_amount: i64,

    /// Largest transfer amount (exclusive)
    #[arg(long, default_value_t = config::DEFAULT_MAX_AMOUNT, allow_negative_numbers = true)]
    max_amount: i64,

    /// Attempts per producer before it gives up
    #[arg(long, default_value_t = config::DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Seed for reproducible request streams
    #[arg(long)]
    seed: Option<u64>,

    /// Output format of the final report
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write final per-account balances to this CSV file
    #[arg(long)]
    balances: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            accounts: self.accounts,
            operations: self.operations,
            initial_balance: self.initial_balance,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            max_attempts: self.max_attempts,
            seed: self.seed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let simulation = Simulation::new(cli.simulation_config()).into_diagnostic()?;
    let report = simulation.run().await.into_diagnostic()?;

    match cli.format {
        Format::Text => {
            println!("Σ = {}", report.final_total);
            println!(
                "transfers: {} succeeded, {} gave up, {} attempts",
                report.succeeded, report.gave_up, report.attempts
            );
        }
        Format::Json => {
            println!("{}", serde_json::to_string(&report).into_diagnostic()?);
        }
    }

    if let Some(path) = cli.balances {
        let file = File::create(path).into_diagnostic()?;
        BalanceWriter::new(file)
            .write_balances(&report.balances)
            .into_diagnostic()?;
    }

    if !report.is_conserved() {
        return Err(miette!(
            "total balance changed from {} to {}",
            report.initial_total,
            report.final_total
        ));
    }

    Ok(())
}
