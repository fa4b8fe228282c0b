use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;
use sr_arq::run::{default_max_duration, run};
use sr_arq::scenario::ScenarioConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fallback message used when no message file is supplied or found, so the
/// binary stays runnable with zero setup.
const DEFAULT_MESSAGE: &str = "Hello, SR over noisy canal! ";
const DEFAULT_MESSAGE_REPEAT: usize = 300;

/// Selective Repeat ARQ engine over a simulated lossy channel.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Scenario selector: 1 (perfect), 2 (noisy), or 3 (unstable).
    #[arg(default_value_t = 1)]
    scenario: u8,

    /// Path to the message file to transmit. Falls back to a canned
    /// message when omitted or missing.
    #[arg(long)]
    message: Option<PathBuf>,
}

fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let scenario = match ScenarioConfig::lookup(cli.scenario) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("usage: sr-arq [1|2|3] [--message <path>]");
            return ExitCode::FAILURE;
        }
    };

    let data = load_message(cli.message.as_deref());

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .expect("failed to build tokio runtime");

    let (stats, _rebuilt) = match rt.block_on(run(&data, scenario, default_max_duration())) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("\nTransmission terminée.");
    println!("{stats}");

    ExitCode::SUCCESS
}

fn load_message(path: Option<&std::path::Path>) -> Vec<u8> {
    let path = path.unwrap_or_else(|| std::path::Path::new("message.txt"));
    std::fs::read(path).unwrap_or_else(|_| DEFAULT_MESSAGE.repeat(DEFAULT_MESSAGE_REPEAT).into_bytes())
}
