//! Campaign management: the CRM data store, campaign save flow and the
//! live audience estimator around the segmentation engine.

pub mod campaigns;
pub mod estimator;
pub mod models;
pub mod seed;
pub mod store;

pub use campaigns::CampaignService;
pub use estimator::AudienceEstimator;
pub use models::{Campaign, CampaignStatus, NewCampaign};
pub use store::{CrmStore, CustomerSource};
