// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use strava_weekly::authenticator::SystemBrowser;
use strava_weekly::config::{load_dotenv, StravaConfig};
use strava_weekly::logging::{LogFormat, LoggingConfig};
use strava_weekly::{pipeline, report};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "strava-weekly")]
#[command(author, version, about = "Summarize your Strava activities by ISO week and type", long_about = None)]
struct Args {
    /// Where the OAuth token is saved (default: STRAVA_TOKEN_FILE or strava_token.json)
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// Local port of the OAuth redirect URI (default: STRAVA_CALLBACK_PORT or 8000)
    #[arg(short, long)]
    port: Option<u16>,

    /// Activities requested per page
    #[arg(long)]
    page_size: Option<u32>,

    /// Give up waiting for the browser redirect after this many seconds
    #[arg(long)]
    callback_timeout: Option<u64>,

    /// Print the summary as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Log output format: pretty, json or compact
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    load_dotenv();

    let mut logging = LoggingConfig::from_env();
    if let Some(format) = args.log_format {
        logging.format = format;
    }
    if let Err(e) = logging.init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = StravaConfig::from_env()?;
    if let Some(token_file) = args.token_file {
        config.token_file = token_file;
    }
    if let Some(port) = args.port {
        config.callback_port = port;
    }
    if let Some(page_size) = args.page_size {
        config.set_page_size(page_size, "--page-size")?;
    }
    if let Some(secs) = args.callback_timeout {
        config.callback_timeout = Some(Duration::from_secs(secs));
    }

    let summary = pipeline::run(&config, SystemBrowser).await?;
    info!(weeks = summary.week_count(), "Report ready");

    if args.json {
        println!("{}", report::render_json(&summary));
    } else {
        print!("{}", report::render_table(&summary));
    }

    Ok(())
}
