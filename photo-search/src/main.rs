use clap::Parser;
use photo_search::config::{Args, Command};
use photo_search::view::TerminalView;
use photo_search::{Application, Config, SearchOutcome, UploadOutcome, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args)?;

    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry()?;
    tracing::debug!("{:?}", args);

    let Some(command) = args.command else {
        anyhow::bail!("No command given. Use `search <QUERY>` or `upload <FILE>`.");
    };

    let app = Application::new(config)?;
    let view = TerminalView::new();

    let succeeded = match command {
        Command::Search { query } => !matches!(app.search(&view, &query).await, SearchOutcome::Failed),
        Command::Upload { file, labels } => matches!(app.upload(&view, &file, &labels).await, UploadOutcome::Uploaded { .. }),
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
