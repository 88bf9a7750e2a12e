use anyhow::Result;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adserve-backend")]
#[command(about = "Ad decision server", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Held for the life of the process so buffered file logs get flushed.
    let mut _file_guard = None;
    let file_layer = match std::env::var("ADSERVE_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir.trim(), "adserve.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            _file_guard = Some(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
        }
        _ => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var("ADSERVE_CONFIG", config);
    }

    backend_bootstrap::run_standalone().await
}
