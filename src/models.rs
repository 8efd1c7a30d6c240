use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ListingDetail {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) url_overridden_by_dest: Option<String>,
}

/// A child entry is kept as raw JSON so one malformed post does not
/// fail the whole page.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Listing {
    pub(crate) data: Value,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ListingData {
    pub(crate) children: Vec<Listing>,
    pub(crate) after: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ListingResponse {
    #[serde(default)]
    pub(crate) kind: String,
    pub(crate) data: ListingData,
}

/// `random.json` answers with `[post_listing, comment_listing]` instead of a
/// single listing object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ListingPayload {
    Single(ListingResponse),
    Many(Vec<ListingResponse>),
}

impl ListingPayload {
    pub fn into_listing(self) -> Option<ListingResponse> {
        match self {
            ListingPayload::Single(listing) => Some(listing),
            ListingPayload::Many(listings) => listings.into_iter().next(),
        }
    }
}

/// One entry of a page, reduced to what the walker needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingItem {
    pub display_name: String,
    pub media_url: Option<String>,
}

impl From<ListingDetail> for ListingItem {
    fn from(detail: ListingDetail) -> Self {
        ListingItem {
            display_name: detail.name,
            media_url: detail.url_overridden_by_dest.filter(|url| !url.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_payload_takes_first_listing() {
        let body = r#"[
            {"kind": "Listing", "data": {"children": [{"data": {"name": "t3_a"}}], "after": null}},
            {"kind": "Listing", "data": {"children": [], "after": null}}
        ]"#;
        let payload: ListingPayload = serde_json::from_str(body).unwrap();
        let listing = payload.into_listing().unwrap();
        assert_eq!(listing.data.children.len(), 1);
    }

    #[test]
    fn empty_media_url_is_absent() {
        let item = ListingItem::from(ListingDetail {
            name: "t3_a".to_string(),
            url_overridden_by_dest: Some("".to_string()),
        });
        assert_eq!(item.media_url, None);
    }

    #[test]
    fn missing_data_is_a_decode_error() {
        let body = r#"{"kind": "Listing", "error": 404}"#;
        assert!(serde_json::from_str::<ListingPayload>(body).is_err());
    }
}
