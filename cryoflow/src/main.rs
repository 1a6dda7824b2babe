use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cryoflow::prelude::*;

// CLI
#[derive(Parser, Debug)]
#[command(name = "cryoflow")]
#[command(version)]
#[command(
    about = "Runs a CryoSPARC workflow from summed micrographs to a homogeneous refinement.",
    long_about = None
)]
struct Cli {
    /// Settings file to preload instead of the latest saved one
    settings_file: Option<PathBuf>,

    /// Directory the settings files are read from and written to
    #[arg(long, default_value = ".")]
    settings_dir: PathBuf,

    /// Seconds between job status checks
    #[arg(long, default_value_t = 5)]
    poll_interval_secs: u64,

    /// Seconds before a request to the service times out
    #[arg(long, default_value_t = 300.0, value_parser = positive_seconds)]
    request_timeout_secs: f64,

    /// Write logs as JSON
    #[arg(long, action)]
    log_json: bool,

    /// Print the settings form as JSON and exit
    #[arg(long, action)]
    print_form: bool,

    #[command(flatten)]
    settings: SettingsOverrides,
}

fn positive_seconds(value: &str) -> Result<f64, String> {
    let seconds: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(format!("expected a positive number of seconds, got {value}"))
    }
}

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cryoflow=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    let store = SettingsStore::new(&cli.settings_dir);
    let settings = store
        .load_previous(cli.settings_file.as_deref())
        .merged_with(&cli.settings);

    if cli.print_form {
        let schema = FormSchema::new(&settings);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    settings.ensure_required()?;

    let saved = store
        .save(&settings, &now_local())
        .context("saving settings")?;
    for path in saved.paths() {
        println!("Settings saved to {}", path.display());
    }

    let config = ClientConfig::new(&settings.host, settings.port)
        .with_timeout(cli.request_timeout_secs);
    let client = CommandClient::new(&config, &settings.license)?;
    info!(url = %config.api_url(), "Connecting to compute service");

    let sink = FanoutSink::new()
        .with(TextSink::stdout())
        .with(LoggingSink::default());
    let wait = WaitOptions::default().with_poll_interval(Duration::from_secs(cli.poll_interval_secs));

    match Workflow::new(&client, &settings, &sink)
        .with_wait_options(wait)
        .run()
        .await
    {
        Ok(report) => {
            info!(
                run_id = %report.run_id,
                workspace = %report.context.workspace.uid,
                selected_classes = report.selection.selected.len(),
                "Run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            Err(e.into())
        }
    }
}
