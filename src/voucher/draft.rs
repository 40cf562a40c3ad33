use super::id::VoucherId;
use super::{LineItem, Voucher, line_total};
use crate::money::Money;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use num_traits::Zero;

/// An in-progress voucher, either brand new or an edit of an existing
/// one. Owns the row invariants: there is always at least one row, stt
/// stays contiguous 1..N in row order, and row totals track every
/// quantity or price edit.
#[derive(Debug, Clone)]
pub struct Draft {
    pub date: NaiveDate,
    pub recipient_unit: String,
    pub driver_name: String,
    pub driver_trip_cost: Money,
    pub notes: String,
    items: Vec<LineItem>,
    next_item_id: u64,
}

impl Draft {
    /// A fresh form: one blank row, dated `date`.
    pub fn new(date: NaiveDate) -> Self {
        let mut draft = Draft {
            date,
            recipient_unit: String::new(),
            driver_name: String::new(),
            driver_trip_cost: Money::zero(),
            notes: String::new(),
            items: Vec::new(),
            next_item_id: 1,
        };
        draft.add_item();
        draft
    }

    /// Edit mode: seeded from an existing voucher. The caller keeps the
    /// voucher's id; everything else is replaced by the draft on save.
    pub fn from_voucher(voucher: &Voucher) -> Self {
        let next_item_id = voucher
            .items
            .iter()
            .filter_map(|item| item.id.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);
        Draft {
            date: voucher.date,
            recipient_unit: voucher.recipient_unit.clone(),
            driver_name: voucher.driver_name.clone(),
            driver_trip_cost: voucher.driver_trip_cost,
            notes: voucher.notes.clone().unwrap_or_default(),
            items: voucher.items.clone(),
            next_item_id,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Appends a blank row and returns its item id.
    pub fn add_item(&mut self) -> String {
        let id = self.next_item_id.to_string();
        self.next_item_id += 1;
        self.items.push(LineItem {
            id: id.clone(),
            stt: self.items.len() as u32 + 1,
            item_name: String::new(),
            quantity: 0.0,
            unit_price: Money::zero(),
            total: Money::zero(),
        });
        id
    }

    /// Appends a filled row in one step.
    pub fn push_item(&mut self, name: &str, quantity: f64, unit_price: Money) -> Result<()> {
        let id = self.add_item();
        self.set_name(&id, name)?;
        self.set_quantity(&id, quantity)?;
        self.set_price(&id, unit_price)
    }

    /// Removes a row and renumbers the rest to a contiguous 1..N.
    /// Removing the only remaining row is a no-op.
    pub fn remove_item(&mut self, id: &str) {
        if self.items.len() == 1 {
            return;
        }
        self.items.retain(|item| item.id != id);
        for (idx, item) in self.items.iter_mut().enumerate() {
            item.stt = idx as u32 + 1;
        }
    }

    /// Item id of the row at display position `stt`.
    pub fn item_id_at(&self, stt: u32) -> Option<String> {
        self.items
            .iter()
            .find(|item| item.stt == stt)
            .map(|item| item.id.clone())
    }

    pub fn set_name(&mut self, id: &str, name: &str) -> Result<()> {
        self.item_mut(id)?.item_name = name.to_owned();
        Ok(())
    }

    pub fn set_quantity(&mut self, id: &str, quantity: f64) -> Result<()> {
        let item = self.item_mut(id)?;
        item.quantity = quantity;
        item.total = line_total(item.quantity, item.unit_price)?;
        Ok(())
    }

    pub fn set_price(&mut self, id: &str, unit_price: Money) -> Result<()> {
        let item = self.item_mut(id)?;
        item.unit_price = unit_price;
        item.total = line_total(item.quantity, item.unit_price)?;
        Ok(())
    }

    fn item_mut(&mut self, id: &str) -> Result<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .context(format!("No item row with id {:?}", id))
    }

    /// Validates the form and produces the voucher to store under `id`.
    /// Totals come from the raw quantities, prices, and trip cost.
    pub fn build(&self, id: VoucherId) -> Result<Voucher> {
        if self.recipient_unit.is_empty() {
            bail!("Recipient unit is required");
        }
        if self.items.iter().any(|item| item.item_name.is_empty()) {
            bail!("Every item row needs a name");
        }
        let mut voucher = Voucher {
            id,
            date: self.date,
            recipient_unit: self.recipient_unit.clone(),
            driver_name: self.driver_name.clone(),
            driver_trip_cost: self.driver_trip_cost,
            items: self.items.clone(),
            grand_total: Money::zero(),
            notes: (!self.notes.is_empty()).then(|| self.notes.clone()),
        };
        voucher.recompute_totals()?;
        Ok(voucher)
    }
}

#[cfg(test)]
mod draft_tests {
    use super::*;
    use std::convert::TryFrom;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn money(f: f64) -> Money {
        Money::try_from(f).unwrap()
    }

    #[test]
    fn removal_renumbers_contiguously() -> Result<()> {
        let mut draft = Draft::new(date());
        let first = draft.items()[0].id.clone();
        draft.set_name(&first, "Xi măng")?;
        for name in ["Cát vàng", "Thép cuộn", "Đá 1x2"] {
            let id = draft.add_item();
            draft.set_name(&id, name)?;
        }
        let second = draft.item_id_at(2).unwrap();
        draft.remove_item(&second);

        let stts: Vec<u32> = draft.items().iter().map(|item| item.stt).collect();
        assert_eq!(stts, vec![1, 2, 3]);
        let names: Vec<&str> = draft
            .items()
            .iter()
            .map(|item| item.item_name.as_str())
            .collect();
        assert_eq!(names, vec!["Xi măng", "Thép cuộn", "Đá 1x2"]);
        Ok(())
    }

    #[test]
    fn removing_the_last_row_is_a_noop() {
        let mut draft = Draft::new(date());
        let only = draft.items()[0].id.clone();
        draft.remove_item(&only);
        assert_eq!(draft.items().len(), 1);
    }

    #[test]
    fn edits_keep_row_totals_current() -> Result<()> {
        let mut draft = Draft::new(date());
        let id = draft.items()[0].id.clone();
        draft.set_quantity(&id, 10.0)?;
        draft.set_price(&id, money(95000.0))?;
        assert_eq!(draft.items()[0].total, money(950000.0));

        draft.set_quantity(&id, 4.0)?;
        assert_eq!(draft.items()[0].total, money(380000.0));
        Ok(())
    }

    #[test]
    fn build_totals_are_consistent() -> Result<()> {
        // three differently shaped item sets, the invariant holds on all
        let sets: Vec<(Vec<(f64, f64)>, f64)> = vec![
            (vec![(10.0, 95000.0)], 250000.0),
            (vec![(2.5, 1200.0), (7.0, 80.0), (1.0, 999999.0)], 0.0),
            (vec![(-3.0, 500.0), (0.0, 0.0)], 120.0),
        ];
        for (rows, trip_cost) in sets {
            let mut draft = Draft::new(date());
            draft.recipient_unit = "Công ty A".to_owned();
            draft.driver_trip_cost = money(trip_cost);
            let seed = draft.items()[0].id.clone();
            for (idx, (quantity, price)) in rows.iter().enumerate() {
                draft.push_item(&format!("Hàng {}", idx + 1), *quantity, money(*price))?;
            }
            draft.remove_item(&seed);

            let voucher = draft.build(VoucherId::from("24.03.000"))?;
            let expected = rows
                .iter()
                .map(|(quantity, price)| line_total(*quantity, money(*price)))
                .sum::<Result<Money>>()?
                + money(trip_cost);
            assert_eq!(voucher.grand_total, expected);
        }
        Ok(())
    }

    #[test]
    fn build_requires_recipient_and_item_names() {
        let mut draft = Draft::new(date());
        let id = draft.items()[0].id.clone();
        draft.set_name(&id, "Xi măng").unwrap();
        assert!(draft.build(VoucherId::from("24.03.000")).is_err());

        draft.recipient_unit = "Công ty A".to_owned();
        draft.set_name(&id, "").unwrap();
        assert!(draft.build(VoucherId::from("24.03.000")).is_err());

        draft.set_name(&id, "Xi măng").unwrap();
        assert!(draft.build(VoucherId::from("24.03.000")).is_ok());
    }

    #[test]
    fn empty_notes_become_absent() -> Result<()> {
        let mut draft = Draft::new(date());
        draft.recipient_unit = "Công ty A".to_owned();
        let id = draft.items()[0].id.clone();
        draft.set_name(&id, "Xi măng")?;
        let voucher = draft.build(VoucherId::from("24.03.000"))?;
        assert_eq!(voucher.notes, None);

        draft.notes = "Giao buổi sáng".to_owned();
        let voucher = draft.build(VoucherId::from("24.03.001"))?;
        assert_eq!(voucher.notes.as_deref(), Some("Giao buổi sáng"));
        Ok(())
    }

    #[test]
    fn edit_mode_continues_item_ids() {
        let mut draft = Draft::new(date());
        draft.add_item();
        let voucher_items: Vec<String> =
            draft.items().iter().map(|item| item.id.clone()).collect();
        assert_eq!(voucher_items, vec!["1", "2"]);

        draft.recipient_unit = "Công ty A".to_owned();
        for id in &voucher_items {
            draft.set_name(id, "Hàng").unwrap();
        }
        let voucher = draft.build(VoucherId::from("24.03.000")).unwrap();

        let mut edit = Draft::from_voucher(&voucher);
        let new_id = edit.add_item();
        assert_eq!(new_id, "3");
    }
}
