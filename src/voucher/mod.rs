pub mod draft;
pub mod id;

use crate::money::Money;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use id::VoucherId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::convert::TryInto;

/// One line within a voucher. `id` is stable across edits of the parent;
/// `stt` is the 1-based display position and is renumbered on removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub stt: u32,
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: Money,
    pub total: Money,
}

impl LineItem {
    /// Line total re-derived from quantity and unit price.
    pub fn computed_total(&self) -> Result<Money> {
        line_total(self.quantity, self.unit_price)
    }
}

/// quantity × unit price, unrounded.
pub fn line_total(quantity: f64, unit_price: Money) -> Result<Money> {
    let quantity: Decimal = quantity
        .try_into()
        .context(format!("Quantity {} is not a usable number", quantity))?;
    let total = unit_price
        .0
        .checked_mul(quantity)
        .context("quantity * unit price overflow")?;
    Ok(Money(total))
}

/// One inbound/outbound voucher. Stored with the exact field names the
/// storage blob has always used. The id is assigned once at first save
/// and never changes; `date` is user-editable and may drift from the
/// month embedded in the id.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: VoucherId,
    pub date: NaiveDate,
    pub recipient_unit: String,
    pub driver_name: String,
    pub driver_trip_cost: Money,
    pub items: Vec<LineItem>,
    pub grand_total: Money,
    pub notes: Option<String>,
}

impl Voucher {
    /// Subtotal over the stored line totals.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(|item| item.total).sum()
    }

    /// Grand total re-derived from raw quantities, prices, and trip cost.
    pub fn computed_grand_total(&self) -> Result<Money> {
        let subtotal = self
            .items
            .iter()
            .map(LineItem::computed_total)
            .sum::<Result<Money>>()?;
        Ok(subtotal + self.driver_trip_cost)
    }

    /// Re-derives every stored total from raw inputs. Stored totals are a
    /// cache; quantity, unit price, and trip cost are the source of truth.
    pub fn recompute_totals(&mut self) -> Result<()> {
        for item in &mut self.items {
            item.total = item.computed_total()?;
        }
        self.grand_total = self.items_total() + self.driver_trip_cost;
        Ok(())
    }
}
