use super::Voucher;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Voucher identifier in `YY.MM.NNN` form. The month prefix records when
/// the id was allocated; nothing reconciles it against the voucher's
/// user-editable date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoucherId(String);

impl VoucherId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VoucherId {
    fn from(s: &str) -> Self {
        VoucherId(s.to_owned())
    }
}

impl fmt::Display for VoucherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Next id for the month of `today`. The counter starts at 000 each
/// month and is always one past the highest counter currently in use for
/// that month: gaps are never refilled, and deleting the highest-numbered
/// voucher frees its counter for the next allocation. A malformed counter
/// segment counts as -1 so one bad legacy id cannot poison allocation.
pub fn next_id(records: &[Voucher], today: NaiveDate) -> VoucherId {
    let prefix = format!("{:02}.{:02}", today.year() % 100, today.month());
    let month_scope = format!("{prefix}.");
    let counters: Vec<i64> = records
        .iter()
        .filter(|record| record.id.0.starts_with(&month_scope))
        .map(|record| {
            let parts: Vec<&str> = record.id.0.split('.').collect();
            if parts.len() == 3 {
                parts[2].parse().unwrap_or(-1)
            } else {
                -1
            }
        })
        .collect();
    match counters.into_iter().max() {
        None => VoucherId(format!("{prefix}.000")),
        Some(max) => VoucherId(format!("{prefix}.{:03}", max + 1)),
    }
}

#[cfg(test)]
mod id_tests {
    use super::*;
    use crate::money::Money;
    use num_traits::Zero;

    fn voucher(id: &str) -> Voucher {
        Voucher {
            id: VoucherId::from(id),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            recipient_unit: "Công ty A".to_owned(),
            driver_name: String::new(),
            driver_trip_cost: Money::zero(),
            items: Vec::new(),
            grand_total: Money::zero(),
            notes: None,
        }
    }

    fn march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn monthly_reset_on_empty() {
        assert_eq!(next_id(&[], march()).as_str(), "24.03.000");
    }

    #[test]
    fn dense_increment_ignores_gaps() {
        let records = vec![
            voucher("24.03.000"),
            voucher("24.03.001"),
            voucher("24.03.003"),
        ];
        // max+1, the gap at 002 is not refilled
        assert_eq!(next_id(&records, march()).as_str(), "24.03.004");
    }

    #[test]
    fn month_rollover_starts_over() {
        let records = vec![voucher("24.03.000"), voucher("24.03.001")];
        let april = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        assert_eq!(next_id(&records, april).as_str(), "24.04.000");
    }

    #[test]
    fn malformed_counters_degrade_to_zero() {
        let records = vec![voucher("24.03.xyz"), voucher("24.03.7.extra")];
        assert_eq!(next_id(&records, march()).as_str(), "24.03.000");
    }

    #[test]
    fn malformed_counter_does_not_block_real_ones() {
        let records = vec![voucher("24.03.xyz"), voucher("24.03.005")];
        assert_eq!(next_id(&records, march()).as_str(), "24.03.006");
    }

    #[test]
    fn counter_grows_past_three_digits() {
        let records = vec![voucher("24.03.999")];
        assert_eq!(next_id(&records, march()).as_str(), "24.03.1000");
    }

    #[test]
    fn prefix_zero_pads_month_and_year() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(next_id(&[], jan).as_str(), "25.01.000");
    }
}
