use campaign_core::CampaignError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentationError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("rule set must contain at least one rule")]
    EmptyRuleSet,
}

impl From<SegmentationError> for CampaignError {
    fn from(err: SegmentationError) -> Self {
        CampaignError::Validation(err.to_string())
    }
}
