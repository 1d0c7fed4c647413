//! Audience segmentation: typed segment rules, chained AND/OR evaluation
//! and per-field comparison over customer records.

pub mod builder;
pub mod clock;
pub mod engine;
pub mod error;
pub mod rules;
pub mod wire;

pub use builder::RuleSetBuilder;
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{count_matches, evaluate, filter, matches, preview, SegmentationEngine};
pub use error::SegmentationError;
pub use rules::{Conjunction, Criterion, NumericOperator, SegmentRule, SegmentRuleSet, TagOperator};
pub use wire::{compile_rule_set, RawSegmentRule};
