use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_DASHBOARD__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Audience evaluation settings shared by the builders and the campaign detail view.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentationConfig {
    /// Matched customers shown in a campaign preview.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
    /// Settling interval before a live audience-size recount runs.
    #[serde(default = "default_recompute_debounce_ms")]
    pub recompute_debounce_ms: u64,
}

/// Demo data generation for the in-memory store.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_customer_count")]
    pub customer_count: usize,
    #[serde(default = "default_order_count")]
    pub order_count: usize,
    /// Fixed RNG seed for reproducible demo data.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_preview_limit() -> usize {
    10
}
fn default_recompute_debounce_ms() -> u64 {
    500
}
fn default_customer_count() -> usize {
    100
}
fn default_order_count() -> usize {
    200
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            preview_limit: default_preview_limit(),
            recompute_debounce_ms: default_recompute_debounce_ms(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            customer_count: default_customer_count(),
            order_count: default_order_count(),
            rng_seed: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPAIGN_DASHBOARD")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
