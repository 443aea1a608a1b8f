//! Structured feedback on automated replies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feedback category vocabulary accepted by the rating grammar
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Helpful,
    Unhelpful,
    Accurate,
    Inaccurate,
    Appropriate,
    Inappropriate,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Helpful => "helpful",
            FeedbackKind::Unhelpful => "unhelpful",
            FeedbackKind::Accurate => "accurate",
            FeedbackKind::Inaccurate => "inaccurate",
            FeedbackKind::Appropriate => "appropriate",
            FeedbackKind::Inappropriate => "inappropriate",
        }
    }
}

impl std::str::FromStr for FeedbackKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "helpful" => Ok(FeedbackKind::Helpful),
            "unhelpful" => Ok(FeedbackKind::Unhelpful),
            "accurate" => Ok(FeedbackKind::Accurate),
            "inaccurate" => Ok(FeedbackKind::Inaccurate),
            "appropriate" => Ok(FeedbackKind::Appropriate),
            "inappropriate" => Ok(FeedbackKind::Inappropriate),
            _ => Err(()),
        }
    }
}

/// Which platform the feedback came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSource {
    Minecraft,
    Discord,
}

/// One recorded rating, append-only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    pub username: String,
    /// Star rating, always within 1..=5
    pub rating: u8,
    pub kind: FeedbackKind,
    pub source: FeedbackSource,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(
        username: impl Into<String>,
        rating: u8,
        kind: FeedbackKind,
        source: FeedbackSource,
    ) -> Self {
        Self {
            username: username.into(),
            rating,
            kind,
            source,
            timestamp: Utc::now(),
        }
    }
}
