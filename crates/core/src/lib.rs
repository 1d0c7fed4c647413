pub mod config;
pub mod error;
pub mod types;

pub use self::config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use types::{Customer, Order, OrderItem};
