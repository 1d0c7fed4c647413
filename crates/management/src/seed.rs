//! Demo data for development: random customers and orders, plus the
//! dashboard's example campaigns.

use campaign_core::{Customer, Order, OrderItem};
use campaign_segmentation::RawSegmentRule;
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::models::NewCampaign;

pub const CUSTOMER_TAGS: [&str; 6] = [
    "high_value",
    "frequent_buyer",
    "new_customer",
    "churned",
    "promotional_sensitive",
    "discount_lover",
];

const PRODUCT_NAMES: [&str; 8] = [
    "T-shirt",
    "Jeans",
    "Sneakers",
    "Watch",
    "Bag",
    "Sunglasses",
    "Hat",
    "Socks",
];

fn random_past_date<R: Rng + ?Sized>(today: NaiveDate, max_days_ago: i64, rng: &mut R) -> NaiveDate {
    today - Duration::days(rng.gen_range(0..max_days_ago))
}

pub fn generate_customers<R: Rng + ?Sized>(
    count: usize,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<Customer> {
    (1..=count)
        .map(|n| {
            let purchase_count: u32 = rng.gen_range(0..20);
            let total_spent =
                (f64::from(purchase_count) * rng.gen_range(50.0..150.0)).round();

            // 0-2 tags; a repeated draw collapses in the set.
            let tag_draws = rng.gen_range(0..3);
            let tags: BTreeSet<String> = (0..tag_draws)
                .filter_map(|_| CUSTOMER_TAGS.choose(rng).map(|t| t.to_string()))
                .collect();

            Customer {
                id: Uuid::new_v4(),
                name: format!("Customer {n}"),
                email: format!("customer{n}@example.com"),
                total_spent,
                purchase_count,
                last_purchase_date: random_past_date(today, 365, rng),
                tags,
            }
        })
        .collect()
}

pub fn generate_orders<R: Rng + ?Sized>(
    customers: &[Customer],
    count: usize,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<Order> {
    if customers.is_empty() {
        return Vec::new();
    }
    (0..count)
        .filter_map(|_| {
            let customer = customers.choose(rng)?;
            let item_count = rng.gen_range(1..=5);
            let items: Vec<OrderItem> = (0..item_count)
                .map(|_| OrderItem {
                    id: Uuid::new_v4(),
                    name: PRODUCT_NAMES
                        .choose(rng)
                        .map_or_else(String::new, |p| p.to_string()),
                    price: f64::from(rng.gen_range(10_u32..110)),
                    quantity: rng.gen_range(1..=3),
                })
                .collect();
            let amount = items
                .iter()
                .map(|i| i.price * f64::from(i.quantity))
                .sum();
            Some(Order {
                id: Uuid::new_v4(),
                customer_id: customer.id,
                date: random_past_date(today, 180, rng),
                amount,
                items,
            })
        })
        .collect()
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

pub fn demo_campaigns() -> Vec<NewCampaign> {
    let mut win_back_recency = rule("lastPurchase", ">", json!(90));
    win_back_recency.conjunction = Some(campaign_segmentation::Conjunction::And);

    vec![
        NewCampaign {
            name: "High Value Customers".to_string(),
            message: "Thank you for being a valued customer! Here's a 15% discount on your next purchase.".to_string(),
            segment_rules: vec![rule("totalSpent", ">", json!(1000))],
        },
        NewCampaign {
            name: "Win-back Campaign".to_string(),
            message: "We miss you! Come back and enjoy 20% off your next order.".to_string(),
            segment_rules: vec![win_back_recency, rule("totalSpent", ">", json!(500))],
        },
        NewCampaign {
            name: "New Summer Collection".to_string(),
            message: "Be the first to shop our new summer collection! Exclusive early access for our best customers.".to_string(),
            segment_rules: vec![rule("tag", "contains", json!("frequent_buyer"))],
        },
    ]
}
