use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::download_listing_page::{SortMode, TimeWindow, DEFAULT_BASE_URL, DEFAULT_LIMIT};
use crate::walker::{WalkOutcome, WalkerConfig};

mod download_file;
mod download_listing_page;
mod error;
mod models;
mod walker;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/110.0";

#[derive(Parser, Debug)]
#[clap(author, version, about = "Download images from a subreddit feed", long_about = None)]
struct Args {
    /// The name of the subreddit.
    #[clap(short, long, value_parser = parse_subreddit)]
    name: String,
    /// The amount of files you wish to download.
    #[clap(short, long, default_value_t = 25)]
    amount: u32,
    /// The type of feed.
    #[clap(short = 't', long = "type", value_enum, default_value_t = SortMode::Top)]
    sort: SortMode,
    /// When the posts were made (also `-tm`).
    #[clap(long, alias = "tm", value_enum, default_value_t = TimeWindow::All)]
    time: TimeWindow,
    /// The folder to save images to [default: downloads/<name>].
    #[clap(short, long)]
    folder: Option<PathBuf>,
    /// The amount of results to get from the API per page.
    #[clap(short, long, default_value_t = DEFAULT_LIMIT,
           value_parser = clap::value_parser!(u32).range(1..=100))]
    limit: u32,
    /// User-Agent sent with every request.
    #[clap(long, env = "REDDIT_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
    #[clap(long, env = "REDDIT_BASE_URL", default_value = DEFAULT_BASE_URL, hide = true)]
    base_url: String,
    /// Enable debug logging.
    #[clap(long)]
    debug: bool,
}

impl Args {
    fn into_walker_config(self) -> WalkerConfig {
        let folder = self
            .folder
            .unwrap_or_else(|| PathBuf::from("downloads").join(&self.name));
        WalkerConfig {
            subreddit: self.name,
            sort: self.sort,
            time: self.time,
            limit: self.limit,
            folder,
            amount: self.amount,
            base_url: self.base_url,
        }
    }
}

fn parse_subreddit(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("subreddit name cannot be empty".to_string());
    }
    if name.contains(['/', '\\']) || name.contains("..") {
        return Err(format!("invalid subreddit name '{}'", name));
    }
    Ok(name.to_string())
}

/// clap only knows single-character short flags, so `-tm`, `-tm=x` and `-tmx`
/// are rewritten to `--time`.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let rewritten = match arg.to_str() {
                Some("-tm") => Some(OsString::from("--time")),
                Some(a) => a.strip_prefix("-tm").map(|value| {
                    let value = value.strip_prefix('=').unwrap_or(value);
                    OsString::from(format!("--time={}", value))
                }),
                None => None,
            };
            rewritten.unwrap_or(arg)
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse_from(normalize_args(std::env::args_os()));

    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let client = reqwest::Client::builder()
        .user_agent(args.user_agent.as_str())
        .build()
        .context("Failed to build HTTP client")?;
    let config = args.into_walker_config();
    info!(
        "Downloading {} {} images from r/{} ({}) into {}",
        config.amount,
        config.sort.as_str(),
        config.subreddit,
        config.time.as_str(),
        config.folder.display()
    );

    let outcome = walker::run(&client, &config)
        .await
        .with_context(|| format!("Walk of r/{} aborted", config.subreddit))?;

    match outcome {
        WalkOutcome::TargetReached { downloaded } => {
            info!("Finished: downloaded {} of {}", downloaded, config.amount)
        }
        WalkOutcome::Exhausted {
            downloaded,
            requested,
        } => warn!(
            "Feed exhausted: downloaded {} of {} requested",
            downloaded, requested
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(normalize_args(args.iter().map(OsString::from)))
    }

    #[test]
    fn defaults_match_cli_table() {
        let config = parse(&["downloader", "-n", "pics"]).into_walker_config();

        assert_eq!(config.subreddit, "pics");
        assert_eq!(config.amount, 25);
        assert_eq!(config.sort, SortMode::Top);
        assert_eq!(config.time, TimeWindow::All);
        assert_eq!(config.limit, 100);
        assert_eq!(config.folder, PathBuf::from("downloads").join("pics"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn short_flags_are_accepted() {
        let config = parse(&[
            "downloader", "-n", "earthporn", "-a", "3", "-t", "new", "-tm", "week", "-f", "out",
            "-l", "50",
        ])
        .into_walker_config();

        assert_eq!(config.amount, 3);
        assert_eq!(config.sort, SortMode::New);
        assert_eq!(config.time, TimeWindow::Week);
        assert_eq!(config.folder, PathBuf::from("out"));
        assert_eq!(config.limit, 50);
    }

    #[test]
    fn time_alias_with_equals() {
        let args = parse(&["downloader", "--name", "pics", "-tm=year"]);
        assert_eq!(args.time, TimeWindow::Year);
    }

    #[test]
    fn time_flag_with_attached_value() {
        let args = parse(&["downloader", "-n", "pics", "-tmweek"]);
        assert_eq!(args.time, TimeWindow::Week);
        assert_eq!(args.sort, SortMode::Top);
    }

    #[test]
    fn name_is_required_and_validated() {
        assert!(Args::try_parse_from(["downloader"]).is_err());
        assert!(Args::try_parse_from(["downloader", "-n", ""]).is_err());
        assert!(Args::try_parse_from(["downloader", "-n", "../etc"]).is_err());
    }

    #[test]
    fn limit_above_endpoint_maximum_is_rejected() {
        assert!(Args::try_parse_from(["downloader", "-n", "pics", "-l", "500"]).is_err());
    }
}
