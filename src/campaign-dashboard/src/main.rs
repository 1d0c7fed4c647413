//! Campaign Dashboard: audience segmentation over the CRM customer base.
//!
//! Seeds the in-memory store, then either evaluates a rule-set file or saves
//! the demo campaigns, and prints audience sizes with a preview as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use campaign_core::config::AppConfig;
use campaign_core::Customer;
use campaign_management::seed::{demo_campaigns, generate_customers, generate_orders};
use campaign_management::{CampaignService, CrmStore, CustomerSource};
use campaign_segmentation::{compile_rule_set, Clock, FixedClock, RawSegmentRule, SegmentationEngine, SystemClock};
use chrono::NaiveDate;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-dashboard")]
#[command(about = "Audience segmentation for CRM campaigns")]
#[command(version)]
struct Cli {
    /// JSON file with an ordered array of segment rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// JSON file with customers to evaluate instead of generated demo data
    #[arg(long)]
    customers_file: Option<PathBuf>,

    /// Number of demo customers to generate (overrides config)
    #[arg(long, env = "CAMPAIGN_DASHBOARD__SEED__CUSTOMER_COUNT")]
    customers: Option<usize>,

    /// RNG seed for reproducible demo data (overrides config)
    #[arg(long, env = "CAMPAIGN_DASHBOARD__SEED__RNG_SEED")]
    seed: Option<u64>,

    /// Reference date for recency rules, YYYY-MM-DD (defaults to today, UTC)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Matched customers to include in the preview (overrides config)
    #[arg(long, env = "CAMPAIGN_DASHBOARD__SEGMENTATION__PREVIEW_LIMIT")]
    preview_limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudienceReport {
    name: String,
    audience_size: usize,
    preview: Vec<PreviewCustomer>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewCustomer {
    #[serde(flatten)]
    customer: Customer,
    order_count: usize,
}

fn preview_rows(store: &CrmStore, customers: Vec<Customer>) -> Vec<PreviewCustomer> {
    customers
        .into_iter()
        .map(|customer| PreviewCustomer {
            order_count: store.orders_for_customer(customer.id).len(),
            customer,
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_dashboard=info,campaign_management=info".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(count) = cli.customers {
        config.seed.customer_count = count;
    }
    if let Some(seed) = cli.seed {
        config.seed.rng_seed = Some(seed);
    }
    if let Some(limit) = cli.preview_limit {
        config.segmentation.preview_limit = limit;
    }

    let clock: Arc<dyn Clock> = match cli.today {
        Some(date) => Arc::new(FixedClock(date)),
        None => Arc::new(SystemClock),
    };
    let today = clock.today();

    info!(
        customers = config.seed.customer_count,
        orders = config.seed.order_count,
        rng_seed = ?config.seed.rng_seed,
        preview_limit = config.segmentation.preview_limit,
        %today,
        "Configuration loaded"
    );

    let store = Arc::new(match &cli.customers_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading customers from {}", path.display()))?;
            let customers: Vec<Customer> =
                serde_json::from_str(&raw).context("parsing customers file")?;
            // Later records with a repeated id replace earlier ones.
            let store = CrmStore::new();
            for customer in customers {
                store.insert_customer(customer);
            }
            store
        }
        None => {
            let mut rng = match config.seed.rng_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let customers = generate_customers(config.seed.customer_count, today, &mut rng);
            let orders = generate_orders(&customers, config.seed.order_count, today, &mut rng);
            CrmStore::with_data(customers, orders)
        }
    });

    info!(
        customers = store.customer_count(),
        orders = store.list_orders().len(),
        "Customer base ready"
    );

    let reports = match &cli.rules {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading rules from {}", path.display()))?;
            let raw_rules: Vec<RawSegmentRule> =
                serde_json::from_str(&raw).context("parsing rules file")?;
            let rules = compile_rule_set(&raw_rules)?;

            let engine = SegmentationEngine::with_clock(Arc::clone(&clock));
            let customers = store.customers();
            vec![AudienceReport {
                name: path.display().to_string(),
                audience_size: engine.count_matches(&customers, &rules),
                preview: preview_rows(
                    &store,
                    engine
                        .preview(&customers, &rules, config.segmentation.preview_limit)
                        .into_iter()
                        .cloned()
                        .collect(),
                ),
            }]
        }
        None => {
            let service = CampaignService::new(Arc::clone(&store), clock, &config.segmentation);
            let mut reports = Vec::new();
            for new_campaign in demo_campaigns() {
                let campaign = service.create_campaign(new_campaign)?;
                reports.push(AudienceReport {
                    preview: preview_rows(&store, service.targeted_customers(campaign.id)?),
                    name: campaign.name,
                    audience_size: campaign.audience_size,
                });
            }
            reports
        }
    };

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
