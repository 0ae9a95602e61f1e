use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tuning knobs of the prioritization pipeline.
///
/// The weights feed the composite score of [`crate::core::scoring`];
/// the day thresholds bucket due-date urgency. Values are taken as
/// given — a caller supplying negative weights gets the ranking it
/// asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub priority_weight: Decimal,
    pub due_weight: Decimal,
    pub category_weight: Decimal,
    pub amount_weight: Decimal,
    pub critical_days: i64,
    pub urgent_days: i64,
    pub moderate_days: i64,
    /// Reserved for surplus/deficit tolerance checks.
    pub overdraft_tolerance: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            priority_weight: dec!(0.4),
            due_weight: dec!(0.3),
            category_weight: dec!(0.2),
            amount_weight: dec!(0.1),
            critical_days: 3,
            urgent_days: 7,
            moderate_days: 15,
            overdraft_tolerance: dec!(0.1),
        }
    }
}
