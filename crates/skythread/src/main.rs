use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use skythread::config::LaunchOptions;
use skythread::render::Console;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse Bluesky posts and their threads from the terminal")]
struct Args {
    /// JSON file with `username`, `password` and optionally `bluesky_url`
    /// and `service`; prompted for when omitted
    #[arg(value_name = "CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Service to log in to (e.g., https://bsky.social); overrides the file
    #[arg(long)]
    service: Option<Url>,

    /// Likes shown per post, 0 to hide the section
    #[arg(long, default_value_t = 10)]
    likes_limit: i64,

    /// Quote posts shown per post, 0 to hide the section
    #[arg(long, default_value_t = 10)]
    quotes_limit: i64,

    /// Print plain URLs instead of OSC 8 terminal hyperlinks
    #[arg(long)]
    no_hyperlinks: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let stdout = std::io::stdout();
    let options = LaunchOptions {
        credentials: args.credentials,
        service: args.service,
        likes_limit: Some(args.likes_limit),
        quotes_limit: Some(args.quotes_limit),
        hyperlinks: !args.no_hyperlinks && stdout.is_terminal(),
    };

    let mut console = Console::new(std::io::stdin().lock(), stdout.lock(), false);
    skythread::app::run(reqwest::Client::new(), options, &mut console).await?;
    Ok(())
}
