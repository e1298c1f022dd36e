//! One-shot brief from the command line
//!
//! Usage: brief [--sector <name>] <TICKER>...

use market_brief_orchestrator::{BriefConfig, BriefOrchestrator, BriefRequest};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn parse_args(args: impl Iterator<Item = String>) -> Result<BriefRequest, String> {
    let mut tickers = Vec::new();
    let mut sector = None;
    let mut args = args;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sector" | "-s" => {
                sector = Some(args.next().ok_or("--sector needs a value")?);
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown flag: {}", flag)),
            _ => tickers.push(arg),
        }
    }

    let request = BriefRequest { tickers, sector };
    request.validate().map_err(|e| e.to_string())?;
    Ok(request)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let request = match parse_args(std::env::args().skip(1)) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: brief [--sector <name>] <TICKER>...");
            std::process::exit(2);
        }
    };

    let config = BriefConfig::from_env()?;
    let orchestrator = BriefOrchestrator::from_config(&config)?;

    info!(tickers = ?request.tickers, "Running brief");
    let result = orchestrator.run(request).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
