//! In-memory CRM store: customers, orders and campaigns.
//!
//! Production: replace with a database-backed implementation of
//! [`CustomerSource`]. This provides the same API surface for development and testing.

use crate::models::Campaign;
use campaign_core::{Customer, Order};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

/// Supplies the customer population that audiences are computed over.
pub trait CustomerSource: Send + Sync {
    fn customers(&self) -> Vec<Customer>;
}

/// Thread-safe in-memory store. Customers and orders keep insertion order.
pub struct CrmStore {
    customers: RwLock<Vec<Customer>>,
    orders: RwLock<Vec<Order>>,
    campaigns: DashMap<Uuid, Campaign>,
}

impl CrmStore {
    pub fn new() -> Self {
        Self {
            customers: RwLock::new(Vec::new()),
            orders: RwLock::new(Vec::new()),
            campaigns: DashMap::new(),
        }
    }

    pub fn with_data(customers: Vec<Customer>, orders: Vec<Order>) -> Self {
        info!(
            customers = customers.len(),
            orders = orders.len(),
            "CRM store initialized (in-memory, development mode)"
        );
        Self {
            customers: RwLock::new(customers),
            orders: RwLock::new(orders),
            campaigns: DashMap::new(),
        }
    }

    // ─── Customers ─────────────────────────────────────────────────────────

    pub fn list_customers(&self) -> Vec<Customer> {
        self.customers.read().clone()
    }

    /// Inserts a customer, replacing any existing record with the same id in place.
    pub fn insert_customer(&self, customer: Customer) {
        let mut customers = self.customers.write();
        match customers.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => *existing = customer,
            None => customers.push(customer),
        }
    }

    pub fn customer_count(&self) -> usize {
        self.customers.read().len()
    }

    // ─── Orders ────────────────────────────────────────────────────────────

    pub fn list_orders(&self) -> Vec<Order> {
        self.orders.read().clone()
    }

    pub fn orders_for_customer(&self, customer_id: Uuid) -> Vec<Order> {
        self.orders
            .read()
            .iter()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect()
    }

    // ─── Campaigns ─────────────────────────────────────────────────────────

    /// Newest first.
    pub fn list_campaigns(&self) -> Vec<Campaign> {
        let mut campaigns: Vec<Campaign> =
            self.campaigns.iter().map(|r| r.value().clone()).collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        campaigns
    }

    pub fn get_campaign(&self, id: Uuid) -> Option<Campaign> {
        self.campaigns.get(&id).map(|r| r.value().clone())
    }

    pub fn insert_campaign(&self, campaign: Campaign) {
        self.campaigns.insert(campaign.id, campaign);
    }
}

impl Default for CrmStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerSource for CrmStore {
    fn customers(&self) -> Vec<Customer> {
        self.list_customers()
    }
}
