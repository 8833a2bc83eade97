use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use link_preview::{LinkPreview, PreviewConfig};

/// Print the link preview for a URL as JSON.
#[derive(Debug, Parser)]
#[command(name = "link-preview", version, about)]
struct Args {
    /// Page to preview; `https://` is assumed when no scheme is given.
    url: String,

    /// Minimum text length for fallback descriptions.
    #[arg(long)]
    min_length: Option<usize>,

    /// Fetch timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long)]
    user_agent: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // JSON logs in production, human-readable otherwise.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("link_preview=info"));

    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let args = Args::parse();

    let mut config = match PreviewConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(min_length) = args.min_length {
        config = config.with_description_min_length(min_length);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_connect_timeout(Duration::from_millis(timeout_ms));
    }
    if let Some(user_agent) = args.user_agent {
        config = config.with_user_agent(user_agent);
    }

    let preview = match LinkPreview::new(config) {
        Ok(preview) => preview,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    info!(url = %args.url, "Loading link preview");
    let result = match preview.load_preview(&args.url).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to serialize preview: {e}");
            ExitCode::FAILURE
        }
    }
}
