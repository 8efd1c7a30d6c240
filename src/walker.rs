use std::path::PathBuf;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::download_file::{download_a_file, DownloadOutcome};
use crate::download_listing_page::{get_listing, ListingRequest, SortMode, TimeWindow};
use crate::error::{DownloadError, WalkError};
use crate::models::ListingItem;

/// Everything a walk needs, resolved from the command line.
#[derive(Clone, Debug)]
pub struct WalkerConfig {
    pub subreddit: String,
    pub sort: SortMode,
    pub time: TimeWindow,
    pub limit: u32,
    pub folder: PathBuf,
    pub amount: u32,
    pub base_url: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum WalkOutcome {
    TargetReached { downloaded: u32 },
    /// The feed ran out of pages before `requested` items were saved.
    Exhausted { downloaded: u32, requested: u32 },
}

enum Flow {
    Continue,
    Stop,
}

struct Session<'a> {
    folder: &'a PathBuf,
    requested: u32,
    downloaded: u32,
    cursor: String,
}

impl<'a> Session<'a> {
    fn new(config: &'a WalkerConfig) -> Self {
        Session {
            folder: &config.folder,
            requested: config.amount,
            downloaded: 0,
            cursor: String::new(),
        }
    }

    fn target_reached(&self) -> bool {
        self.downloaded >= self.requested
    }

    fn exhausted(&self) -> WalkOutcome {
        WalkOutcome::Exhausted {
            downloaded: self.downloaded,
            requested: self.requested,
        }
    }

    async fn process_item(&mut self, client: &Client, item: &ListingItem) -> Result<Flow, WalkError> {
        let name = &item.display_name;
        match download_a_file(client, item, self.folder).await {
            Ok(DownloadOutcome::Saved(path)) => {
                self.downloaded += 1;
                info!("Downloaded: {}", name);
                debug!(path = %path.display(), "Saved");
            }
            Ok(DownloadOutcome::NoMediaUrl) => info!("No media url for {}, skipped", name),
            Ok(DownloadOutcome::BadName) => warn!("Unusable file name {:?}, skipped", name),
            Err(DownloadError::Remote { status }) => {
                warn!("Failed to download {}: {}", name, status)
            }
            Err(DownloadError::Transport(e)) => warn!("Failed to download {}: {}", name, e),
            Err(DownloadError::Io(e)) => return Err(WalkError::Io(e)),
        }

        if self.target_reached() {
            Ok(Flow::Stop)
        } else {
            Ok(Flow::Continue)
        }
    }
}

/// Walk the feed page by page until `config.amount` items are saved or the
/// feed has no further cursor.
pub async fn run(client: &Client, config: &WalkerConfig) -> Result<WalkOutcome, WalkError> {
    let mut session = Session::new(config);
    if session.target_reached() {
        return Ok(WalkOutcome::TargetReached { downloaded: 0 });
    }

    loop {
        let request = ListingRequest {
            subreddit: &config.subreddit,
            sort: config.sort,
            time: config.time,
            limit: Some(config.limit),
            after: &session.cursor,
        };
        let page = get_listing(client, &config.base_url, &request).await?;

        for item in &page.items {
            if let Flow::Stop = session.process_item(client, item).await? {
                return Ok(WalkOutcome::TargetReached {
                    downloaded: session.downloaded,
                });
            }
        }

        match page.after {
            Some(next) if next != session.cursor => session.cursor = next,
            Some(next) => {
                warn!("Feed did not advance past cursor {}", next);
                return Ok(session.exhausted());
            }
            None => return Ok(session.exhausted()),
        }
    }
}
