use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use shopsync::presentation::cli_summary::{print_perf_summary, print_sku_refresh, print_summary};
use shopsync::{AppConfig, LogLevel, SyncMode};

#[derive(Parser, Debug)]
#[command(
    name = "shopsync",
    version,
    about = "Reconcile VidaXL stock and prices against Shopify into Matrixify update files."
)]
struct Cli {
    #[arg(short, long, global = true, default_value = "shopsync.toml")]
    config: String,

    /// Debug-level logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare one field and write the update + report CSVs when anything differs.
    Sync {
        #[arg(short, long, value_enum)]
        mode: ModeArg,

        /// Compute and print the summary without writing files or the baseline.
        #[arg(long)]
        dry_run: bool,

        /// Cap fetched records and differences; never saves the baseline.
        #[arg(long)]
        test_mode: bool,

        /// Cap used in test mode (implies --test-mode).
        #[arg(long)]
        test_limit: Option<usize>,

        /// Print fetch and reconcile timings.
        #[arg(long)]
        perf: bool,
    },
    /// Re-fetch every storefront SKU into the SKU cache used by the delta modes.
    RefreshSkus,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Inventory,
    InventoryDelta,
    Price,
    PriceLive,
}

impl From<ModeArg> for SyncMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Inventory => SyncMode::Inventory,
            ModeArg::InventoryDelta => SyncMode::InventoryDelta,
            ModeArg::Price => SyncMode::Price,
            ModeArg::PriceLive => SyncMode::PriceLive,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env is fine; the scheduler usually injects the variables.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    shopsync::init_tracing(match (cli.verbose, cli.quiet) {
        (true, _) => LogLevel::Debug,
        (_, true) => LogLevel::Error,
        _ => LogLevel::Info,
    });

    let mut cfg = AppConfig::load(&cli.config)?;

    match cli.command {
        Command::Sync {
            mode,
            dry_run,
            test_mode,
            test_limit,
            perf,
        } => {
            if test_mode || test_limit.is_some() {
                cfg.sync.test_mode = true;
            }
            if let Some(limit) = test_limit {
                cfg.sync.test_limit = limit;
            }

            let (outcome, report) = shopsync::run_with_timing(&cfg, mode.into(), dry_run).await?;
            print_summary(&outcome.reconciliation, &outcome.written, dry_run);
            if perf {
                print_perf_summary(&report);
            }
        }
        Command::RefreshSkus => {
            let count = shopsync::refresh_sku_cache(&cfg).await?;
            print_sku_refresh(count, &cfg.state.sku_cache);
        }
    }

    Ok(())
}
