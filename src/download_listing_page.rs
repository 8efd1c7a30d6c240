use reqwest::Client;
use tracing::{debug, warn};

use crate::error::PageError;
use crate::models::{ListingDetail, ListingItem, ListingPayload, ListingResponse};

pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_LIMIT: u32 = 100;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortMode {
    Controversial,
    Best,
    Hot,
    New,
    Random,
    Rising,
    #[default]
    Top,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Controversial => "controversial",
            SortMode::Best => "best",
            SortMode::Hot => "hot",
            SortMode::New => "new",
            SortMode::Random => "random",
            SortMode::Rising => "rising",
            SortMode::Top => "top",
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeWindow {
    Today,
    Now,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Today => "today",
            TimeWindow::Now => "now",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }
}

/// Parameters of a single listing request. `after` is empty for the first page.
#[derive(Clone, Debug)]
pub struct ListingRequest<'a> {
    pub subreddit: &'a str,
    pub sort: SortMode,
    pub time: TimeWindow,
    pub limit: Option<u32>,
    pub after: &'a str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListingPage {
    pub items: Vec<ListingItem>,
    pub after: Option<String>,
}

pub(crate) fn parse_items_from_page(listing_response: ListingResponse) -> ListingPage {
    let items = listing_response
        .data
        .children
        .into_iter()
        .filter_map(|child| match serde_json::from_value::<ListingDetail>(child.data) {
            Ok(detail) => Some(ListingItem::from(detail)),
            Err(e) => {
                warn!("Skipping malformed listing entry: {}", e);
                None
            }
        })
        .collect();

    ListingPage {
        items,
        after: listing_response.data.after.filter(|after| !after.is_empty()),
    }
}

pub async fn get_listing(
    client: &Client,
    base_url: &str,
    request: &ListingRequest<'_>,
) -> Result<ListingPage, PageError> {
    let url = format!(
        "{}/r/{}/{}.json",
        base_url.trim_end_matches('/'),
        request.subreddit,
        request.sort.as_str()
    );
    let limit = request.limit.unwrap_or(DEFAULT_LIMIT).to_string();
    debug!(url = %url, after = request.after, "Requesting listing page");

    let response = client
        .get(&url)
        .query(&[
            ("t", request.time.as_str()),
            ("limit", limit.as_str()),
            ("after", request.after),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(PageError::Status(status));
    }

    let body = response.text().await?;
    let listing = serde_json::from_str::<ListingPayload>(&body)?
        .into_listing()
        .ok_or(PageError::Empty)?;
    let page = parse_items_from_page(listing);
    debug!(items = page.items.len(), after = ?page.after, "Received listing page");

    Ok(page)
}
