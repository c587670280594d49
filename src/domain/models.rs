//! Domain model for synced catalog items.
//!
//! The base payload scraped off an item page is kept as an opaque JSON map
//! and passed through to the store untouched; only the identifier, canonical
//! URL, lifecycle state and the two count indicators are ever read from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SyncError;

/// The only lifecycle state with engine semantics: live items that dropped
/// off the listing are re-checked, everything else is terminal.
pub const STATE_LIVE: &str = "live";

/// One entry of an item's activity log. Title and body are
/// whitespace-normalized at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub title: String,
    pub body: String,
}

/// One retained entry of an item's discussion thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionEntry {
    pub body: String,
    /// Detected language tag, only set at HIGH detector confidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Per-entry sentiment histogram, only set for English entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentHistogram>,
    pub creator: bool,
    pub superbacker: bool,
}

impl DiscussionEntry {
    pub fn new(body: String, creator: bool, superbacker: bool) -> Self {
        Self {
            body,
            language: None,
            sentiment: None,
            creator,
            superbacker,
        }
    }
}

/// Sentiment classes, one per histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl Sentiment {
    fn bucket(self) -> usize {
        match self {
            Sentiment::VeryNegative => 0,
            Sentiment::Negative => 1,
            Sentiment::Neutral => 2,
            Sentiment::Positive => 3,
            Sentiment::VeryPositive => 4,
        }
    }
}

/// Fixed 5-bucket count vector over sentiment classes,
/// very-negative through very-positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SentimentHistogram(pub [u32; 5]);

impl SentimentHistogram {
    pub fn record(&mut self, sentiment: Sentiment) {
        self.0[sentiment.bucket()] += 1;
    }

    /// Vector sum with another histogram.
    pub fn merge(&mut self, other: &SentimentHistogram) {
        for (slot, add) in self.0.iter_mut().zip(other.0.iter()) {
            *slot += add;
        }
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// A fully or partially assembled catalog item.
///
/// Constructed fresh per sweep from the base payload; the optional fields
/// are populated by the assembler and merged into the stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: i64,
    base: Map<String, Value>,
    pub description: Option<String>,
    pub risks: Option<String>,
    pub faq_count: i64,
    pub updates: Option<Vec<ActivityEntry>>,
    pub comments: Option<Vec<DiscussionEntry>>,
    pub sentiment_histogram: Option<SentimentHistogram>,
}

impl Item {
    /// Build an item from a decoded base payload. Fails when the payload
    /// carries no integer identifier.
    pub fn from_base(base: Map<String, Value>) -> Result<Self, SyncError> {
        let id = base
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| SyncError::extraction("payload has no integer `id` field"))?;
        Ok(Self {
            id,
            base,
            description: None,
            risks: None,
            faq_count: 0,
            updates: None,
            comments: None,
            sentiment_histogram: None,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Canonical item URL, as published in the base payload.
    pub fn url(&self) -> Option<&str> {
        self.web_url("project")
    }

    /// Activity-log URL, as published in the base payload.
    pub fn updates_url(&self) -> Option<&str> {
        self.web_url("updates")
    }

    fn web_url(&self, key: &str) -> Option<&str> {
        self.base
            .get("urls")?
            .get("web")?
            .get(key)?
            .as_str()
    }

    /// Lifecycle state. Opaque except for [`STATE_LIVE`].
    pub fn state(&self) -> &str {
        self.base
            .get("state")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Activity-log count indicator. Optimization hint only, never
    /// authoritative: a nonzero count just enables the walk.
    pub fn updates_count(&self) -> i64 {
        self.count_field("updates_count")
    }

    /// Discussion count indicator, same caveat as [`Self::updates_count`].
    pub fn comments_count(&self) -> i64 {
        self.count_field("comments_count")
    }

    fn count_field(&self, key: &str) -> i64 {
        self.base.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    /// Merge the base payload with the assembled fields into the document
    /// that gets stored. The base map is passed through untouched; the
    /// assembled fields are written on top of it.
    pub fn to_record(&self) -> Value {
        let mut record = self.base.clone();
        if let Some(description) = &self.description {
            record.insert("description".to_string(), Value::from(description.clone()));
        }
        if let Some(risks) = &self.risks {
            record.insert("risks".to_string(), Value::from(risks.clone()));
        }
        record.insert("faqCount".to_string(), Value::from(self.faq_count));
        if let Some(updates) = &self.updates {
            record.insert(
                "updates".to_string(),
                serde_json::to_value(updates).unwrap_or(Value::Null),
            );
        }
        if let Some(comments) = &self.comments {
            record.insert(
                "comments".to_string(),
                serde_json::to_value(comments).unwrap_or(Value::Null),
            );
        }
        if let Some(histogram) = &self.sentiment_histogram {
            record.insert(
                "sentimentHistogram".to_string(),
                serde_json::to_value(histogram).unwrap_or(Value::Null),
            );
        }
        Value::Object(record)
    }
}

/// Projection of a stored item used by the straggler re-check.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub id: i64,
    pub url: String,
    pub state: String,
}
