//! Segment rule types and per-field comparison logic.
//!
//! A rule set is evaluated strictly left to right with no precedence or
//! grouping: `A AND B OR C` means `(A AND B) OR C`. This flat model is what
//! the segment and campaign builders expose and is kept as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Joiner between a rule and the one after it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conjunction {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl Conjunction {
    pub fn combine(self, acc: bool, next: bool) -> bool {
        match self {
            Conjunction::And => acc && next,
            Conjunction::Or => acc || next,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericOperator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = "≥", alias = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "≤", alias = "<=")]
    LessThanOrEqual,
}

impl NumericOperator {
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Self::GreaterThan),
            "<" => Some(Self::LessThan),
            "=" => Some(Self::Equals),
            "≥" | ">=" => Some(Self::GreaterThanOrEqual),
            "≤" | "<=" => Some(Self::LessThanOrEqual),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Equals => "=",
            Self::GreaterThanOrEqual => "≥",
            Self::LessThanOrEqual => "≤",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOperator {
    Contains,
    DoesNotContain,
}

impl TagOperator {
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "contains" => Some(Self::Contains),
            "does_not_contain" => Some(Self::DoesNotContain),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::DoesNotContain => "does_not_contain",
        }
    }
}

/// What a single rule tests. One variant per customer field, each with the
/// operators that field supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum Criterion {
    TotalSpent {
        operator: NumericOperator,
        value: f64,
    },
    PurchaseCount {
        operator: NumericOperator,
        value: f64,
    },
    /// Compared against whole days since the last purchase.
    LastPurchase {
        operator: NumericOperator,
        days: f64,
    },
    Tag {
        operator: TagOperator,
        tag: String,
    },
    /// Unknown field or an operator the field does not support. Matches nobody.
    /// Keeps the rule as written so it can be stored back unchanged.
    Unsatisfiable {
        name: String,
        operator: String,
        value: Value,
    },
}

impl Criterion {
    /// Field name as the dashboard spells it.
    pub fn field_name(&self) -> &str {
        match self {
            Criterion::TotalSpent { .. } => "totalSpent",
            Criterion::PurchaseCount { .. } => "purchaseCount",
            Criterion::LastPurchase { .. } => "lastPurchase",
            Criterion::Tag { .. } => "tag",
            Criterion::Unsatisfiable { name, .. } => name.as_str(),
        }
    }

    pub fn is_satisfiable(&self) -> bool {
        !matches!(self, Criterion::Unsatisfiable { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRule {
    /// Stable id for editing; evaluation ignores it.
    pub id: Uuid,
    pub criterion: Criterion,
    /// Joiner to the next rule. Ignored on the last rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conjunction: Option<Conjunction>,
}

impl SegmentRule {
    pub fn new(criterion: Criterion) -> Self {
        Self {
            id: Uuid::new_v4(),
            criterion,
            conjunction: None,
        }
    }

    pub fn with_conjunction(mut self, conjunction: Conjunction) -> Self {
        self.conjunction = Some(conjunction);
        self
    }

    pub fn conjunction_or_default(&self) -> Conjunction {
        self.conjunction.unwrap_or_default()
    }
}

/// Ordered rules defining an audience. Order matters.
pub type SegmentRuleSet = Vec<SegmentRule>;

/// Exact comparison; no epsilon on equality.
pub fn compare(actual: f64, operator: NumericOperator, expected: f64) -> bool {
    match operator {
        NumericOperator::GreaterThan => actual > expected,
        NumericOperator::LessThan => actual < expected,
        NumericOperator::Equals => actual == expected,
        NumericOperator::GreaterThanOrEqual => actual >= expected,
        NumericOperator::LessThanOrEqual => actual <= expected,
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::TotalSpent { operator, value } => {
                write!(f, "totalSpent {} {}", operator.symbol(), value)
            }
            Criterion::PurchaseCount { operator, value } => {
                write!(f, "purchaseCount {} {}", operator.symbol(), value)
            }
            Criterion::LastPurchase { operator, days } => {
                write!(f, "lastPurchase {} {} days", operator.symbol(), days)
            }
            Criterion::Tag { operator, tag } => write!(f, "tag {} {}", operator.symbol(), tag),
            Criterion::Unsatisfiable { name, operator, .. } => {
                write!(f, "{name} {operator} (unsupported)")
            }
        }
    }
}
