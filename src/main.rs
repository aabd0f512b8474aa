use clap::Parser;
use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use kpb::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Cli::parse();
  let _guard = init_logging();

  cli::run(args).await
}

/// Log to a daily file under the data directory so stdout stays clean for
/// command output. Falls back to stderr when there is no data directory.
fn init_logging() -> WorkerGuard {
  let filter = EnvFilter::try_from_env("KPB_LOG").unwrap_or_else(|_| EnvFilter::new("kpb=info"));

  let (writer, guard) = match dirs::data_dir() {
    Some(dir) => {
      let appender = tracing_appender::rolling::daily(dir.join("kpb").join("logs"), "kpb.log");
      tracing_appender::non_blocking(appender)
    }
    None => tracing_appender::non_blocking(std::io::stderr()),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  guard
}
