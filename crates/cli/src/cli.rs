use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use jobtrack_client::api::JobApi;
use jobtrack_client::config::{ClientConfig, MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};
use jobtrack_core::submission::{
    JbaCredentials, PaperFormat, PdfRequest, SubmitResponse, TournamentRequest,
};
use jobtrack_core::types::JobId;

use crate::watch::{self, WatchOptions};

/// Exit status for errors other than a job outcome.
pub const EXIT_ERROR: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "jobtrack",
    version,
    about = "Submit roster jobs and follow them to completion",
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Backend base URL. Overrides JOBTRACK_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Poll interval in milliseconds. Overrides POLL_INTERVAL_MS.
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    /// Log level when RUST_LOG is unset (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Follow an existing job until it finishes.
    Watch {
        job_id: String,
        /// Print the backend's diagnostic detail if the job fails.
        #[arg(long)]
        show_detail: bool,
    },

    /// Upload a CSV roster for JBA matching.
    SubmitCsv {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        university: Option<String>,
        #[arg(long)]
        watch: bool,
        /// With --watch: print the diagnostic detail if the job fails.
        #[arg(long, requires = "watch")]
        show_detail: bool,
    },

    /// Fetch every roster of a tournament.
    SubmitTournament {
        #[arg(long)]
        game_id: String,
        #[arg(long, env = "JBA_EMAIL")]
        email: String,
        #[arg(long, env = "JBA_PASSWORD", hide_env_values = true)]
        password: String,
        /// Skip PDF generation.
        #[arg(long)]
        no_pdf: bool,
        #[arg(long)]
        watch: bool,
        /// With --watch: print the diagnostic detail if the job fails.
        #[arg(long, requires = "watch")]
        show_detail: bool,
    },

    /// Generate roster PDFs for one or more universities.
    SubmitPdf {
        #[arg(long = "university", required = true)]
        universities: Vec<String>,
        #[arg(long, env = "JBA_EMAIL")]
        email: Option<String>,
        #[arg(long, env = "JBA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long)]
        include_photos: bool,
        #[arg(long, value_enum, default_value_t = FormatArg::A4)]
        format: FormatArg,
        #[arg(long)]
        watch: bool,
        /// With --watch: print the diagnostic detail if the job fails.
        #[arg(long, requires = "watch")]
        show_detail: bool,
    },

    /// List every job the backend knows about.
    Jobs,

    /// Delete a job and its record.
    Delete { job_id: String },

    /// Probe the backend health endpoint.
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    A4,
    Letter,
}

impl From<FormatArg> for PaperFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::A4 => PaperFormat::A4,
            FormatArg::Letter => PaperFormat::Letter,
        }
    }
}

/// Install the global subscriber: `jobtrack=info` unless `RUST_LOG` is
/// set, JSON lines when `LOG_FORMAT=json`. Logs go to stderr so stdout
/// carries only results.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let default = format!("jobtrack={}", level.unwrap_or("info"));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))
}

/// Environment configuration with command-line overrides applied.
pub fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("invalid environment configuration")?;
    if let Some(url) = &args.api_url {
        config.api_url = jobtrack_client::config::normalize_api_url(url)?;
    }
    if let Some(ms) = args.interval_ms {
        config.poll_interval =
            Duration::from_millis(ms.clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS));
    }
    Ok(config)
}

/// Credentials for `submit-pdf`: both halves or neither.
pub fn optional_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<Option<JbaCredentials>> {
    match (email, password) {
        (Some(email), Some(password)) => Ok(Some(JbaCredentials { email, password })),
        (None, None) => Ok(None),
        _ => bail!("--email and --password must be given together"),
    }
}

/// Run the selected subcommand and return the process exit status.
pub async fn dispatch(args: Args) -> Result<u8> {
    let config = resolve_config(&args)?;
    let api = Arc::new(JobApi::from_config(&config)?);

    tracing::debug!(api_url = %config.api_url, interval_ms = config.poll_interval.as_millis() as u64, "Configuration loaded");

    let options = |show_detail| WatchOptions {
        interval: config.poll_interval,
        show_detail,
    };

    let (submitted, follow) = match args.cmd {
        Command::Watch {
            job_id,
            show_detail,
        } => {
            let exit = watch::watch(api, &job_id, options(show_detail)).await?;
            return Ok(exit.code());
        }
        Command::SubmitCsv {
            file,
            university,
            watch,
            show_detail,
        } => (
            api.submit_csv(&file, university.as_deref()).await?,
            watch.then_some(show_detail),
        ),
        Command::SubmitTournament {
            game_id,
            email,
            password,
            no_pdf,
            watch,
            show_detail,
        } => {
            let request = TournamentRequest {
                game_id,
                jba_credentials: JbaCredentials { email, password },
                generate_pdf: !no_pdf,
            };
            (
                api.submit_tournament(&request).await?,
                watch.then_some(show_detail),
            )
        }
        Command::SubmitPdf {
            universities,
            email,
            password,
            include_photos,
            format,
            watch,
            show_detail,
        } => {
            let request = PdfRequest {
                universities,
                jba_credentials: optional_credentials(email, password)?,
                include_photos,
                format: format.into(),
            };
            (api.submit_pdf(&request).await?, watch.then_some(show_detail))
        }
        Command::Jobs => {
            let list = api.list_jobs().await?;
            for job in &list.jobs {
                println!(
                    "{:<40} {:<12} {:>3}%  {}",
                    job.job_id.as_str(),
                    job.status.as_str(),
                    jobtrack_core::progress::percent(job.progress.unwrap_or(0.0)),
                    job.created_at.as_deref().unwrap_or("-"),
                );
            }
            println!("{} job(s)", list.total);
            return Ok(0);
        }
        Command::Delete { job_id } => {
            let deleted = api.delete_job(&JobId::parse(&job_id)?).await?;
            println!("{} {}", deleted.status, deleted.job_id);
            return Ok(0);
        }
        Command::Health => {
            println!("{}", serde_json::to_string_pretty(&api.health().await?)?);
            return Ok(0);
        }
    };

    print_submitted(&submitted);
    if let Some(show_detail) = follow {
        let exit = watch::watch(api, submitted.job_id.as_str(), options(show_detail)).await?;
        return Ok(exit.code());
    }
    Ok(0)
}

fn print_submitted(submitted: &SubmitResponse) {
    println!("job_id: {}", submitted.job_id);
    if let Some(message) = &submitted.message {
        println!("message: {message}");
    }
    if let Some(url) = &submitted.polling_url {
        println!("polling: {url}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watch() {
        let args = Args::try_parse_from(["jobtrack", "watch", "abc-123"]).unwrap();
        match args.cmd {
            Command::Watch {
                job_id,
                show_detail,
            } => {
                assert_eq!(job_id, "abc-123");
                assert!(!show_detail);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "jobtrack",
            "jobs",
            "--api-url",
            "http://backend:8000",
            "--interval-ms",
            "250",
        ])
        .unwrap();
        assert_eq!(args.api_url.as_deref(), Some("http://backend:8000"));
        assert_eq!(args.interval_ms, Some(250));
    }

    #[test]
    fn submit_pdf_collects_repeated_universities() {
        let args = Args::try_parse_from([
            "jobtrack",
            "submit-pdf",
            "--university",
            "Tokai",
            "--university",
            "Keio",
            "--format",
            "letter",
            "--watch",
        ])
        .unwrap();
        match args.cmd {
            Command::SubmitPdf {
                universities,
                format,
                watch,
                include_photos,
                ..
            } => {
                assert_eq!(universities, vec!["Tokai", "Keio"]);
                assert_eq!(PaperFormat::from(format), PaperFormat::Letter);
                assert!(watch);
                assert!(!include_photos);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_detail_flag_is_parsed() {
        let args =
            Args::try_parse_from(["jobtrack", "watch", "abc-123", "--show-detail"]).unwrap();
        assert!(matches!(args.cmd, Command::Watch { show_detail: true, .. }));

        let args = Args::try_parse_from([
            "jobtrack",
            "submit-csv",
            "--file",
            "roster.csv",
            "--watch",
            "--show-detail",
        ])
        .unwrap();
        assert!(matches!(
            args.cmd,
            Command::SubmitCsv {
                watch: true,
                show_detail: true,
                ..
            }
        ));
    }

    #[test]
    fn show_detail_requires_watch_on_submit() {
        assert!(Args::try_parse_from([
            "jobtrack",
            "submit-csv",
            "--file",
            "roster.csv",
            "--show-detail",
        ])
        .is_err());
    }

    #[test]
    fn submit_pdf_requires_a_university() {
        assert!(Args::try_parse_from(["jobtrack", "submit-pdf"]).is_err());
    }

    #[test]
    fn credentials_must_be_paired() {
        assert!(optional_credentials(None, None).unwrap().is_none());
        assert!(optional_credentials(Some("a@b.c".into()), Some("pw".into()))
            .unwrap()
            .is_some());
        assert!(optional_credentials(Some("a@b.c".into()), None).is_err());
        assert!(optional_credentials(None, Some("pw".into())).is_err());
    }
}
