use crate::money::Money;
use crate::voucher::Voucher;
use chrono::NaiveDate;
use itertools::Itertools;
use num_traits::Zero;
use std::collections::HashMap;

/// Running debt position of one recipient unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerAggregate<'a> {
    pub name: String,
    pub total_debt: Money,
    pub transaction_count: usize,
    pub last_transaction: NaiveDate,
    /// The record bearing the most recent date. Among equal dates the
    /// record seen later in collection order wins.
    pub latest: &'a Voucher,
}

/// Groups the collection by recipient unit. Keys are the raw strings,
/// matched exactly, case included. Pure: scanning the same collection
/// twice yields the same aggregates.
pub fn aggregate_by_partner(records: &[Voucher]) -> HashMap<String, PartnerAggregate<'_>> {
    let mut partners: HashMap<String, PartnerAggregate> = HashMap::new();
    for record in records {
        let agg = partners
            .entry(record.recipient_unit.clone())
            .or_insert_with(|| PartnerAggregate {
                name: record.recipient_unit.clone(),
                total_debt: Money::zero(),
                transaction_count: 0,
                last_transaction: record.date,
                latest: record,
            });
        agg.total_debt += record.grand_total;
        agg.transaction_count += 1;
        if record.date >= agg.last_transaction {
            agg.last_transaction = record.date;
            agg.latest = record;
        }
    }
    partners
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub total_value: Money,
    pub item_count: usize,
    pub partner_count: usize,
    pub voucher_count: usize,
}

pub fn stats(records: &[Voucher]) -> Stats {
    Stats {
        total_value: records.iter().map(|record| record.grand_total).sum(),
        item_count: records.iter().map(|record| record.items.len()).sum(),
        partner_count: records
            .iter()
            .map(|record| record.recipient_unit.as_str())
            .unique()
            .count(),
        voucher_count: records.len(),
    }
}
