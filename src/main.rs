use std::{path::PathBuf, time::Duration};

use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use hitscout::{
    cli,
    config::{self, Backoff, DashboardConfig, IngestSettings, Pacing},
    error,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Collect tracks from Spotify and export them as CSV
    Fetch(FetchOptions),

    /// Export the Last.fm top tracks chart as CSV
    Lastfm(LastfmOptions),

    /// Score a CSV file with the trained model
    Predict(PredictOptions),

    /// Start the prediction dashboard
    Serve(ServeOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct FetchOptions {
    /// Output CSV file
    #[clap(long, default_value = "spotify_tracks.csv")]
    pub output: PathBuf,

    /// Maximum number of distinct tracks to collect
    #[clap(long, default_value_t = 100)]
    pub quota: usize,

    /// Track ids per audio-features request
    #[clap(long, default_value_t = 100)]
    pub feature_batch_size: usize,

    /// Artist ids per artists request (max 50)
    #[clap(long, default_value_t = 50)]
    pub artist_batch_size: usize,

    /// Results requested per search query (max 50)
    #[clap(long, default_value_t = 50)]
    pub search_limit: u32,

    /// Search query; can be repeated and replaces the built-in query list
    #[clap(long = "query", action = ArgAction::Append, num_args = 1)]
    pub queries: Vec<String>,

    /// Pause between search queries in milliseconds
    #[clap(long, default_value_t = 500)]
    pub query_pause_ms: u64,

    /// Pause after each audio-features batch in milliseconds
    #[clap(long, default_value_t = 500)]
    pub batch_pause_ms: u64,

    /// Pause after each artists batch in milliseconds
    #[clap(long, default_value_t = 300)]
    pub artist_pause_ms: u64,

    /// Wait used when a 429 response has no Retry-After header
    #[clap(long, default_value_t = 5)]
    pub default_retry_after: u64,

    /// Give up on a throttled request after this many retries (default: never)
    #[clap(long)]
    pub max_retries: Option<u32>,
}

impl From<FetchOptions> for IngestSettings {
    fn from(opt: FetchOptions) -> Self {
        let defaults = IngestSettings::default();
        IngestSettings {
            queries: if opt.queries.is_empty() {
                defaults.queries
            } else {
                opt.queries
            },
            track_quota: opt.quota,
            search_limit: opt.search_limit,
            search_offset: defaults.search_offset,
            feature_batch_size: opt.feature_batch_size,
            artist_batch_size: opt.artist_batch_size,
            pacing: Pacing {
                query_pause: Duration::from_millis(opt.query_pause_ms),
                batch_pause: Duration::from_millis(opt.batch_pause_ms),
                artist_pause: Duration::from_millis(opt.artist_pause_ms),
            },
            backoff: Backoff {
                default_retry_after: Duration::from_secs(opt.default_retry_after),
                max_retries: opt.max_retries,
            },
            output: opt.output,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct LastfmOptions {
    /// Number of chart positions to fetch
    #[clap(long, default_value_t = 100)]
    pub limit: u32,

    /// Output CSV file
    #[clap(long, default_value = "lastfm_tracks.csv")]
    pub output: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct PredictOptions {
    /// CSV file to score
    pub input: PathBuf,

    /// Directory holding the model artifacts (defaults to MODEL_DIR)
    #[clap(long)]
    pub model_dir: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Directory holding the model artifacts (defaults to MODEL_DIR)
    #[clap(long)]
    pub model_dir: Option<PathBuf>,

    /// Address to bind (defaults to SERVER_ADDRESS)
    #[clap(long)]
    pub address: Option<String>,

    /// Open the dashboard in the default browser
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Fetch(opt) => cli::fetch(opt.into()).await,
        Command::Lastfm(opt) => cli::lastfm(opt.limit, opt.output).await,
        Command::Predict(opt) => {
            let dashboard = DashboardConfig::from_env();
            cli::predict(opt.input, opt.model_dir.unwrap_or(dashboard.model_dir)).await
        }
        Command::Serve(opt) => {
            let mut dashboard = DashboardConfig::from_env();
            if let Some(model_dir) = opt.model_dir {
                dashboard.model_dir = model_dir;
            }
            if let Some(address) = opt.address {
                dashboard.address = address;
            }
            cli::serve(dashboard, opt.open).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
