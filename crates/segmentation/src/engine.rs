//! Audience matching: evaluates customers against an ordered rule set.
//!
//! Everything here is a pure function of the customers, the rules and the
//! reference date. The free functions take the date explicitly;
//! [`SegmentationEngine`] reads it from a [`Clock`] once per call.

use campaign_core::Customer;
use chrono::NaiveDate;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::rules::{compare, Criterion, SegmentRule, TagOperator};

/// Whole calendar days between the last purchase and `today`, in either direction.
pub fn days_since(last_purchase: NaiveDate, today: NaiveDate) -> i64 {
    (today - last_purchase).num_days().abs()
}

/// Evaluates a single criterion against one customer.
pub fn evaluate(customer: &Customer, criterion: &Criterion, today: NaiveDate) -> bool {
    match criterion {
        Criterion::TotalSpent { operator, value } => {
            compare(customer.total_spent, *operator, *value)
        }
        Criterion::PurchaseCount { operator, value } => {
            compare(f64::from(customer.purchase_count), *operator, *value)
        }
        Criterion::LastPurchase { operator, days } => {
            let elapsed = days_since(customer.last_purchase_date, today);
            compare(elapsed as f64, *operator, *days)
        }
        Criterion::Tag { operator, tag } => match operator {
            TagOperator::Contains => customer.has_tag(tag),
            TagOperator::DoesNotContain => !customer.has_tag(tag),
        },
        Criterion::Unsatisfiable { .. } => false,
    }
}

/// Left fold over the rules. The conjunction stored on rule `i - 1` joins
/// rule `i`; every rule is evaluated exactly once. An empty set matches nobody.
pub fn matches(customer: &Customer, rules: &[SegmentRule], today: NaiveDate) -> bool {
    let Some((first, rest)) = rules.split_first() else {
        return false;
    };

    let mut result = evaluate(customer, &first.criterion, today);
    let mut previous = first;
    for rule in rest {
        let next = evaluate(customer, &rule.criterion, today);
        result = previous.conjunction_or_default().combine(result, next);
        previous = rule;
    }
    result
}

/// Matching customers in input order.
pub fn filter<'a>(
    customers: &'a [Customer],
    rules: &[SegmentRule],
    today: NaiveDate,
) -> Vec<&'a Customer> {
    customers
        .iter()
        .filter(|customer| matches(customer, rules, today))
        .collect()
}

pub fn count_matches(customers: &[Customer], rules: &[SegmentRule], today: NaiveDate) -> usize {
    customers
        .iter()
        .filter(|customer| matches(customer, rules, today))
        .count()
}

/// The first `limit` matches, in input order.
pub fn preview<'a>(
    customers: &'a [Customer],
    rules: &[SegmentRule],
    today: NaiveDate,
    limit: usize,
) -> Vec<&'a Customer> {
    customers
        .iter()
        .filter(|customer| matches(customer, rules, today))
        .take(limit)
        .collect()
}

/// Rule evaluation bound to a clock.
pub struct SegmentationEngine<C: Clock = SystemClock> {
    clock: C,
}

impl SegmentationEngine<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl Default for SegmentationEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SegmentationEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn matches(&self, customer: &Customer, rules: &[SegmentRule]) -> bool {
        matches(customer, rules, self.clock.today())
    }

    pub fn filter<'a>(&self, customers: &'a [Customer], rules: &[SegmentRule]) -> Vec<&'a Customer> {
        let today = self.clock.today();
        let matched = filter(customers, rules, today);
        debug!(
            %today,
            rules = rules.len(),
            population = customers.len(),
            matched = matched.len(),
            "Filtered customers by rule set"
        );
        matched
    }

    pub fn count_matches(&self, customers: &[Customer], rules: &[SegmentRule]) -> usize {
        let today = self.clock.today();
        let count = count_matches(customers, rules, today);
        debug!(
            %today,
            rules = rules.len(),
            population = customers.len(),
            audience_size = count,
            "Counted audience"
        );
        count
    }

    pub fn preview<'a>(
        &self,
        customers: &'a [Customer],
        rules: &[SegmentRule],
        limit: usize,
    ) -> Vec<&'a Customer> {
        preview(customers, rules, self.clock.today(), limit)
    }
}
