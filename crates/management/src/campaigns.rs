//! Campaign save flow and audience queries over the store.

use std::sync::Arc;

use campaign_core::config::SegmentationConfig;
use campaign_core::{CampaignError, CampaignResult, Customer};
use campaign_segmentation::{compile_rule_set, Clock, RawSegmentRule, SegmentationEngine, SegmentationError};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::{Campaign, CampaignStatus, NewCampaign};
use crate::store::{CrmStore, CustomerSource};

pub struct CampaignService {
    store: Arc<CrmStore>,
    engine: SegmentationEngine<Arc<dyn Clock>>,
    preview_limit: usize,
}

impl CampaignService {
    pub fn new(store: Arc<CrmStore>, clock: Arc<dyn Clock>, config: &SegmentationConfig) -> Self {
        Self {
            store,
            engine: SegmentationEngine::with_clock(clock),
            preview_limit: config.preview_limit,
        }
    }

    pub fn store(&self) -> &Arc<CrmStore> {
        &self.store
    }

    /// Validates and stores a draft campaign. The audience size is the
    /// number of matching customers right now.
    pub fn create_campaign(&self, req: NewCampaign) -> CampaignResult<Campaign> {
        if req.name.trim().is_empty() {
            return Err(CampaignError::Validation("Campaign name required".to_string()));
        }
        if req.message.trim().is_empty() {
            return Err(CampaignError::Validation("Message required".to_string()));
        }
        if req.segment_rules.is_empty() {
            return Err(SegmentationError::EmptyRuleSet.into());
        }

        let audience_size = self.audience_size(&req.segment_rules)?;
        let campaign = Campaign {
            id: Uuid::new_v4(),
            name: req.name,
            segment_rules: req.segment_rules,
            message: req.message,
            created_at: Utc::now(),
            sent_count: 0,
            delivered_count: 0,
            failed_count: 0,
            audience_size,
            status: CampaignStatus::Draft,
        };
        self.store.insert_campaign(campaign.clone());
        info!(
            campaign_id = %campaign.id,
            name = %campaign.name,
            audience_size,
            "Campaign created"
        );
        Ok(campaign)
    }

    /// Customers matching `rules` in the current store.
    pub fn audience_size(&self, rules: &[RawSegmentRule]) -> CampaignResult<usize> {
        let rules = compile_rule_set(rules)?;
        let customers = self.store.customers();
        Ok(self.engine.count_matches(&customers, &rules))
    }

    /// First matches for a saved campaign, capped at the preview limit.
    pub fn targeted_customers(&self, campaign_id: Uuid) -> CampaignResult<Vec<Customer>> {
        let campaign = self
            .store
            .get_campaign(campaign_id)
            .ok_or_else(|| CampaignError::NotFound(format!("campaign {campaign_id}")))?;
        let rules = compile_rule_set(&campaign.segment_rules)?;
        let customers = self.store.customers();
        Ok(self
            .engine
            .preview(&customers, &rules, self.preview_limit)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_segmentation::FixedClock;
    use chrono::NaiveDate;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn customer(total_spent: f64, tags: &[&str]) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: "Customer".to_string(),
            email: "customer@example.com".to_string(),
            total_spent,
            purchase_count: 1,
            last_purchase_date: today(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn service(customers: Vec<Customer>, preview_limit: usize) -> CampaignService {
        let store = Arc::new(CrmStore::with_data(customers, vec![]));
        let config = SegmentationConfig {
            preview_limit,
            ..SegmentationConfig::default()
        };
        CampaignService::new(store, Arc::new(FixedClock(today())), &config)
    }

    fn rule(field: &str, operator: &str, value: serde_json::Value) -> RawSegmentRule {
        RawSegmentRule {
            id: Uuid::new_v4(),
            field: field.to_string(),
            operator: operator.to_string(),
            value,
            conjunction: None,
        }
    }

    fn new_campaign(rules: Vec<RawSegmentRule>) -> NewCampaign {
        NewCampaign {
            name: "Big spenders".to_string(),
            message: "Thanks!".to_string(),
            segment_rules: rules,
        }
    }

    #[test]
    fn test_create_campaign_records_audience_size() {
        let svc = service(
            vec![customer(1200.0, &[]), customer(800.0, &[]), customer(50.0, &[])],
            10,
        );
        let campaign = svc
            .create_campaign(new_campaign(vec![rule("totalSpent", ">", json!(1000))]))
            .unwrap();
        assert_eq!(campaign.audience_size, 1);
        assert_eq!(campaign.status, CampaignStatus::Draft);
        assert_eq!(campaign.sent_count, 0);
        assert!(svc.store().get_campaign(campaign.id).is_some());
    }

    #[test]
    fn test_create_campaign_requires_name_and_message() {
        let svc = service(vec![], 10);
        let mut req = new_campaign(vec![rule("totalSpent", ">", json!(0))]);
        req.name = "   ".to_string();
        let err = svc.create_campaign(req).unwrap_err();
        assert!(matches!(err, CampaignError::Validation(ref m) if m == "Campaign name required"));

        let mut req = new_campaign(vec![rule("totalSpent", ">", json!(0))]);
        req.message = String::new();
        let err = svc.create_campaign(req).unwrap_err();
        assert!(matches!(err, CampaignError::Validation(ref m) if m == "Message required"));
        assert!(svc.store().list_campaigns().is_empty());
    }

    #[test]
    fn test_create_campaign_rejects_empty_and_malformed_rules() {
        let svc = service(vec![customer(10.0, &[])], 10);
        assert!(matches!(
            svc.create_campaign(new_campaign(vec![])),
            Err(CampaignError::Validation(_))
        ));
        assert!(matches!(
            svc.create_campaign(new_campaign(vec![rule("tag", "contains", json!(["a", "b"]))])),
            Err(CampaignError::Validation(_))
        ));
    }

    #[test]
    fn test_unsupported_rule_saves_with_empty_audience() {
        let svc = service(vec![customer(10.0, &[]), customer(5000.0, &[])], 10);
        let campaign = svc
            .create_campaign(new_campaign(vec![rule("totalSpent", "contains", json!(1))]))
            .unwrap();
        assert_eq!(campaign.audience_size, 0);
    }

    #[test]
    fn test_audience_size_of_empty_rules_is_zero() {
        let svc = service(vec![customer(10.0, &[])], 10);
        assert_eq!(svc.audience_size(&[]).unwrap(), 0);
    }

    #[test]
    fn test_targeted_customers_preview_is_capped() {
        let customers: Vec<Customer> = (0..25).map(|_| customer(100.0, &["frequent_buyer"])).collect();
        let first_id = customers[0].id;
        let svc = service(customers, 10);
        let campaign = svc
            .create_campaign(new_campaign(vec![rule("tag", "contains", json!("frequent_buyer"))]))
            .unwrap();
        assert_eq!(campaign.audience_size, 25);

        let preview = svc.targeted_customers(campaign.id).unwrap();
        assert_eq!(preview.len(), 10);
        assert_eq!(preview[0].id, first_id);
    }

    #[test]
    fn test_targeted_customers_unknown_campaign() {
        let svc = service(vec![], 10);
        assert!(matches!(
            svc.targeted_customers(Uuid::new_v4()),
            Err(CampaignError::NotFound(_))
        ));
    }
}
