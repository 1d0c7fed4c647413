//! Campaign types as the dashboard stores them.

use campaign_segmentation::RawSegmentRule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Campaign ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub segment_rules: Vec<RawSegmentRule>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub sent_count: u64,
    pub delivered_count: u64,
    pub failed_count: u64,
    /// Matching customers at save time.
    pub audience_size: usize,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sent,
    Failed,
}

/// Payload from the campaign builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub name: String,
    pub message: String,
    pub segment_rules: Vec<RawSegmentRule>,
}
