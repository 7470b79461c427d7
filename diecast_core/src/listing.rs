//! Normalized listing types shared by every source adapter.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price text used when a source does not expose a price for an item.
pub const PRICE_NOT_FOUND: &str = "Price not found";

/// Which external origin produced a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "STMDiecast")]
    StmDiecast,
    #[serde(rename = "LiveCarModel")]
    LiveCarModel,
    #[serde(rename = "Replicarz")]
    Replicarz,
    #[serde(rename = "eBay")]
    Ebay,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::StmDiecast,
        Source::LiveCarModel,
        Source::Replicarz,
        Source::Ebay,
    ];

    /// Stable identifier used for config sections and log fields.
    pub fn id(&self) -> &'static str {
        match self {
            Source::StmDiecast => "stmdiecast",
            Source::LiveCarModel => "livecarmodel",
            Source::Replicarz => "replicarz",
            Source::Ebay => "ebay",
        }
    }

    /// Display label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Source::StmDiecast => "STMDiecast",
            Source::LiveCarModel => "LiveCarModel",
            Source::Replicarz => "Replicarz",
            Source::Ebay => "eBay",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized search result.
///
/// Serializes to exactly `{title, price, link, image, source}`; `image` is
/// `null` when the source has no picture for the item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub price: String,
    pub link: String,
    pub image: Option<String>,
    pub source: Source,
}

impl Listing {
    /// Build a listing, normalizing the optional fields.
    ///
    /// Returns `None` when the trimmed title is empty or `link` is not an
    /// absolute http(s) URL. A missing or blank price becomes
    /// [`PRICE_NOT_FOUND`]; a blank image becomes `None`.
    pub fn new(
        source: Source,
        title: impl AsRef<str>,
        price: Option<String>,
        link: impl AsRef<str>,
        image: Option<String>,
    ) -> Option<Self> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return None;
        }

        let link = link.as_ref().trim();
        let parsed = url::Url::parse(link).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }

        let price = price
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| PRICE_NOT_FOUND.to_string());

        let image = image
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty());

        Some(Self {
            title: title.to_string(),
            price,
            link: link.to_string(),
            image,
            source,
        })
    }

    pub fn has_price(&self) -> bool {
        self.price != PRICE_NOT_FOUND
    }
}

/// A validated, request-scoped search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    encoded: String,
}

impl Query {
    /// Trim and validate raw user input.
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(SearchError::InvalidInput("Missing query".to_string()));
        }
        Ok(Self {
            text: text.to_string(),
            encoded: urlencoding::encode(text).into_owned(),
        })
    }

    /// The query as typed (trimmed). Used for relevance scoring only.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Percent-encoded form; the only form interpolated into outbound URLs.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_serializes_exact_schema() {
        let listing = Listing::new(
            Source::StmDiecast,
            "  Ferrari 250 GTO 1:18 ",
            None,
            "https://www.stmdiecast.com/products/ferrari-250-gto",
            None,
        )
        .unwrap();

        let value = serde_json::to_value(&listing).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        assert_eq!(obj["title"], "Ferrari 250 GTO 1:18");
        assert_eq!(obj["price"], PRICE_NOT_FOUND);
        assert!(obj["image"].is_null());
        assert_eq!(obj["source"], "STMDiecast");
        assert!(!listing.has_price());
    }

    #[test]
    fn test_listing_rejects_blank_title_and_relative_link() {
        assert!(Listing::new(Source::Ebay, "   ", None, "https://ebay.com/itm/1", None).is_none());
        assert!(Listing::new(Source::Ebay, "Porsche 911", None, "/itm/1", None).is_none());
        assert!(Listing::new(Source::Ebay, "Porsche 911", None, "ftp://x.y/z", None).is_none());
    }

    #[test]
    fn test_listing_blank_image_is_none() {
        let listing = Listing::new(
            Source::Replicarz,
            "Porsche 911 RSR",
            Some("$89.99".into()),
            "https://replicarz.com/p/1",
            Some("  ".into()),
        )
        .unwrap();
        assert_eq!(listing.image, None);
        assert_eq!(listing.price, "$89.99");
    }

    #[test]
    fn test_query_parse_and_encode() {
        assert!(Query::parse("").is_err());
        assert!(Query::parse(" \t\n").is_err());

        let q = Query::parse("  porsche 911 & co ").unwrap();
        assert_eq!(q.as_str(), "porsche 911 & co");
        assert_eq!(q.encoded(), "porsche%20911%20%26%20co");
    }

    #[test]
    fn test_source_ids_round_trip() {
        for source in Source::ALL {
            assert_eq!(Source::from_id(source.id()), Some(source));
        }
        assert_eq!(Source::Ebay.to_string(), "eBay");
        assert_eq!(
            serde_json::to_string(&Source::LiveCarModel).unwrap(),
            "\"LiveCarModel\""
        );
    }
}
