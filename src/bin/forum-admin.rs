use clap::Parser;
use forum_api::cli::{self, output, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forum_api=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = output::OutputFormat::from_flag(cli.json);

    if let Err(e) = cli::run(cli, forum_api::config::config()).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => output::error(&format, &format!("{e:?}")),
            _ => output::error(&format, &format!("{e:#}")),
        }
        std::process::exit(1);
    }

    Ok(())
}
