//! `jobtrack` -- submit roster jobs and follow them to completion.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 | Description                         |
//! |------------------------|----------|-------------------------|-------------------------------------|
//! | `JOBTRACK_API_URL`     | no       | `http://localhost:8000` | Backend base URL                    |
//! | `POLL_INTERVAL_MS`     | no       | `500`                   | Status poll cadence                 |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                    | Per-request HTTP timeout            |
//! | `LOG_FORMAT`           | no       | --                      | `json` for structured log lines     |
//! | `JBA_EMAIL`            | no       | --                      | Default for `--email`               |
//! | `JBA_PASSWORD`         | no       | --                      | Default for `--password`            |
//!
//! Exit status: `0` job done with a download, `1` job failed, `2` job
//! done without a download, `3` any other error.

use std::process::ExitCode;

use clap::Parser;

use jobtrack_cli::cli;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = cli::Args::parse();

    if let Err(err) = cli::init_logging(args.log_level.as_deref()) {
        eprintln!("{err:#}");
        return ExitCode::from(cli::EXIT_ERROR);
    }

    match cli::dispatch(args).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(cli::EXIT_ERROR)
        }
    }
}
