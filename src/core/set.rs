use super::row::{AllocationRow, Recipient, RowEdit, RowId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Allowed deviation of the percent total from 100 at submit time.
pub const PERCENT_TOLERANCE: Decimal = dec!(1);

/// Submit-time validation failures. Row state is never auto-corrected to
/// make these go away; the user has to edit.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("allocated {total}% of the invoice, expected 100% (\u{00B1}1%)")]
    TotalPercentOutOfRange { total: Decimal },
    #[error("row {row} has no department")]
    MissingDepartment { row: usize },
}

/// The cost split for one invoice: an arena of rows addressed by stable
/// handle, with an explicit order list for display.
///
/// A set always contains at least one row. The effective (net) invoice
/// value is passed into every operation that converts between percent and
/// value; the set does not cache it, so it can never go stale.
#[derive(Debug, Clone)]
pub struct AllocationSet {
    rows: HashMap<RowId, AllocationRow>,
    order: Vec<RowId>,
    next_id: u64,
}

impl AllocationSet {
    /// Fresh set for a newly selected company: a single default row at
    /// 0% / 0 value.
    pub fn new(company: impl Into<String>) -> Self {
        let mut set = AllocationSet {
            rows: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
        };
        let recipient = Recipient {
            company: company.into(),
            ..Default::default()
        };
        set.insert_row(recipient);
        set
    }

    fn alloc_id(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_row(&mut self, recipient: Recipient) -> RowId {
        let id = self.alloc_id();
        self.rows.insert(id, AllocationRow::new(id, recipient));
        self.order.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = &AllocationRow> {
        self.order.iter().filter_map(move |id| self.rows.get(id))
    }

    pub fn row(&self, id: RowId) -> Option<&AllocationRow> {
        self.rows.get(&id)
    }

    /// Direct access for edits the engine does not synchronize, such as a
    /// row's reinvoice destinations.
    pub fn row_mut(&mut self, id: RowId) -> Option<&mut AllocationRow> {
        self.rows.get_mut(&id)
    }

    /// Apply a field edit to exactly one row. Edits to an unknown id are
    /// ignored; no sibling row is ever touched.
    pub fn apply(&mut self, id: RowId, edit: RowEdit, effective: Decimal) {
        let row = match self.rows.get_mut(&id) {
            Some(row) => row,
            None => return,
        };
        match edit {
            RowEdit::Percent(percent) => {
                row.percent = percent;
                row.value = effective * percent / dec!(100);
            }
            RowEdit::Value(value) => {
                row.value = value;
                // Until a gross value exists, percent is the only
                // meaningful axis; skip the back-conversion.
                if effective > Decimal::ZERO {
                    row.percent = value / effective * dec!(100);
                }
            }
            RowEdit::Target(recipient) => row.recipient = recipient,
            RowEdit::Locked(locked) => row.locked = locked,
            RowEdit::Comment(comment) => row.comment = comment,
        }
    }

    /// Append a new default row and split the share not claimed by locked
    /// rows equally across all unlocked rows, the new one included.
    pub fn add_row(&mut self, effective: Decimal) -> RowId {
        let id = self.insert_row(Recipient::default());
        let remaining = dec!(100) - self.locked_total();
        // remaining goes negative when locked rows already exceed 100;
        // it is handed out as-is, not clamped.
        let share_count = self.unlocked_count();
        let per_row = remaining / Decimal::from(share_count);
        log::debug!(
            "add row {}: {} unlocked rows share {}% ({}% each)",
            id,
            share_count,
            remaining,
            per_row
        );
        self.spread_unlocked(per_row, effective);
        id
    }

    /// Remove a row and hand its share to the remaining unlocked rows.
    /// A set never drops below one row; removing the last row is a no-op.
    pub fn remove_row(&mut self, id: RowId, effective: Decimal) {
        if self.order.len() <= 1 {
            return;
        }
        if self.rows.remove(&id).is_none() {
            return;
        }
        self.order.retain(|&r| r != id);

        let share_count = self.unlocked_count();
        if share_count == 0 {
            // Only locked rows remain: nobody absorbs the vacated share,
            // so the total drops below 100 until the user edits again.
            log::debug!("remove row {}: only locked rows remain, share not reclaimed", id);
            return;
        }
        let available = dec!(100) - self.locked_total();
        let per_row = available / Decimal::from(share_count);
        log::debug!(
            "remove row {}: {} unlocked rows share {}% ({}% each)",
            id,
            share_count,
            available,
            per_row
        );
        self.spread_unlocked(per_row, effective);
    }

    /// Re-base every row's value onto a new effective invoice value.
    /// Percentages are never altered here.
    pub fn rescale(&mut self, effective: Decimal) {
        for row in self.rows.values_mut() {
            row.value = effective * row.percent / dec!(100);
        }
    }

    /// Replace the whole set with a single unlocked row at 100%, populated
    /// from a confident suggestion.
    pub fn apply_suggestion(&mut self, target: Recipient, effective: Decimal) {
        self.rows.clear();
        self.order.clear();
        let id = self.alloc_id();
        let mut row = AllocationRow::new(id, target);
        row.percent = dec!(100);
        row.value = effective;
        self.rows.insert(id, row);
        self.order.push(id);
    }

    /// Sum of all row percentages, locked or not. Read-only.
    pub fn total_percent(&self) -> Decimal {
        self.rows.values().map(|r| r.percent).sum()
    }

    /// All submit-time issues, in display order.
    pub fn submit_issues(&self) -> Vec<AllocationError> {
        let mut issues = Vec::new();
        let total = self.total_percent();
        if (total - dec!(100)).abs() > PERCENT_TOLERANCE {
            issues.push(AllocationError::TotalPercentOutOfRange { total });
        }
        for (position, row) in self.iter().enumerate() {
            if row.recipient.department.is_empty() {
                issues.push(AllocationError::MissingDepartment { row: position + 1 });
            }
        }
        issues
    }

    /// Gate for submission; fails with the first issue found.
    pub fn validate_for_submit(&self) -> Result<(), AllocationError> {
        match self.submit_issues().into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }

    fn locked_total(&self) -> Decimal {
        self.rows
            .values()
            .filter(|r| r.locked)
            .map(|r| r.percent)
            .sum()
    }

    fn unlocked_count(&self) -> usize {
        self.rows.values().filter(|r| !r.locked).count()
    }

    fn spread_unlocked(&mut self, per_row: Decimal, effective: Decimal) {
        for row in self.rows.values_mut().filter(|r| !r.locked) {
            row.percent = per_row;
            row.value = effective * per_row / dec!(100);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vat::effective_value;

    const EFF: Decimal = dec!(1000);

    fn first_id(set: &AllocationSet) -> RowId {
        set.iter().next().map(|r| r.id).unwrap()
    }

    /// Set with a department on every row so only the percent total decides
    /// validation.
    fn with_departments(set: &mut AllocationSet) {
        let ids: Vec<RowId> = set.iter().map(|r| r.id).collect();
        for id in ids {
            let recipient = Recipient {
                company: "acme".to_string(),
                department: "marketing".to_string(),
                ..Default::default()
            };
            set.apply(id, RowEdit::Target(recipient), EFF);
        }
    }

    #[test]
    fn fresh_set_has_single_zero_row() {
        let set = AllocationSet::new("acme");
        assert_eq!(set.len(), 1);
        let row = set.iter().next().unwrap();
        assert_eq!(row.recipient.company, "acme");
        assert_eq!(row.percent, dec!(0));
        assert_eq!(row.value, dec!(0));
        assert!(!row.locked);
    }

    #[test]
    fn set_percent_derives_value_for_that_row_only() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        let b = set.add_row(EFF);

        set.apply(a, RowEdit::Percent(dec!(60)), EFF);

        assert_eq!(set.row(a).unwrap().percent, dec!(60));
        assert_eq!(set.row(a).unwrap().value, dec!(600));
        // the sibling keeps whatever add_row gave it
        assert_eq!(set.row(b).unwrap().percent, dec!(50));
        assert_eq!(set.row(b).unwrap().value, dec!(500));
    }

    #[test]
    fn set_value_derives_percent() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);

        set.apply(a, RowEdit::Value(dec!(250)), EFF);

        assert_eq!(set.row(a).unwrap().value, dec!(250));
        assert_eq!(set.row(a).unwrap().percent, dec!(25));
    }

    #[test]
    fn set_value_with_zero_effective_keeps_percent() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        set.apply(a, RowEdit::Percent(dec!(40)), dec!(0));

        set.apply(a, RowEdit::Value(dec!(123)), dec!(0));

        assert_eq!(set.row(a).unwrap().value, dec!(123));
        assert_eq!(set.row(a).unwrap().percent, dec!(40));
    }

    #[test]
    fn edits_to_unknown_id_are_ignored() {
        let mut set = AllocationSet::new("acme");
        let before = set.total_percent();
        set.apply(RowId(999), RowEdit::Percent(dec!(50)), EFF);
        assert_eq!(set.total_percent(), before);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn direct_edits_never_rebalance_siblings() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        let b = set.add_row(EFF);
        set.apply(a, RowEdit::Percent(dec!(80)), EFF);
        set.apply(b, RowEdit::Percent(dec!(80)), EFF);

        // both rows now claim 80%; the engine leaves the conflict for
        // submit-time validation
        assert_eq!(set.total_percent(), dec!(160));
        assert!(set.validate_for_submit().is_err());
    }

    #[test]
    fn add_row_splits_equally_with_no_locked_rows() {
        let mut set = AllocationSet::new("acme");
        set.add_row(EFF);
        assert!(set.iter().all(|r| r.percent == dec!(50)));

        set.add_row(EFF);
        let third = dec!(100) / dec!(3);
        assert_eq!(set.len(), 3);
        for row in set.iter() {
            assert_eq!(row.percent, third);
            assert_eq!(row.value, EFF * third / dec!(100));
        }
        assert!((set.total_percent() - dec!(100)).abs() < dec!(0.0001));
    }

    #[test]
    fn add_row_leaves_locked_rows_untouched() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        set.apply(a, RowEdit::Percent(dec!(40)), EFF);
        set.apply(a, RowEdit::Locked(true), EFF);

        let b = set.add_row(EFF);

        assert_eq!(set.row(a).unwrap().percent, dec!(40));
        assert_eq!(set.row(a).unwrap().value, dec!(400));
        assert_eq!(set.row(b).unwrap().percent, dec!(60));
        assert_eq!(set.row(b).unwrap().value, dec!(600));

        let c = set.add_row(EFF);
        // 60% left for two unlocked rows
        assert_eq!(set.row(b).unwrap().percent, dec!(30));
        assert_eq!(set.row(c).unwrap().percent, dec!(30));
        assert_eq!(set.row(a).unwrap().percent, dec!(40));
    }

    #[test]
    fn locked_rows_over_100_push_unlocked_negative() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        set.apply(a, RowEdit::Percent(dec!(120)), EFF);
        set.apply(a, RowEdit::Locked(true), EFF);

        let b = set.add_row(EFF);

        // -20% remaining for one unlocked row; not clamped
        assert_eq!(set.row(b).unwrap().percent, dec!(-20));
        assert_eq!(set.row(b).unwrap().value, dec!(-200));
        assert_eq!(set.row(a).unwrap().percent, dec!(120));
    }

    #[test]
    fn remove_row_redistributes_equally() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        let b = set.add_row(EFF);
        let c = set.add_row(EFF);

        set.remove_row(c, EFF);

        assert_eq!(set.len(), 2);
        assert_eq!(set.row(a).unwrap().percent, dec!(50));
        assert_eq!(set.row(b).unwrap().percent, dec!(50));
        assert_eq!(set.row(a).unwrap().value, dec!(500));
    }

    #[test]
    fn remove_row_respects_locked_rows() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        let b = set.add_row(EFF);
        let c = set.add_row(EFF);
        set.apply(a, RowEdit::Percent(dec!(40)), EFF);
        set.apply(a, RowEdit::Locked(true), EFF);

        set.remove_row(b, EFF);

        assert_eq!(set.row(a).unwrap().percent, dec!(40));
        assert_eq!(set.row(c).unwrap().percent, dec!(60));
        assert_eq!(set.row(c).unwrap().value, dec!(600));
    }

    #[test]
    fn remove_last_row_is_a_noop() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        set.apply(a, RowEdit::Percent(dec!(100)), EFF);

        set.remove_row(a, EFF);

        assert_eq!(set.len(), 1);
        assert_eq!(set.row(a).unwrap().percent, dec!(100));
    }

    #[test]
    fn remove_unknown_id_is_a_noop() {
        let mut set = AllocationSet::new("acme");
        set.add_row(EFF);
        set.remove_row(RowId(999), EFF);
        assert_eq!(set.len(), 2);
        assert_eq!(set.total_percent(), dec!(100));
    }

    #[test]
    fn removing_last_unlocked_row_leaves_vacated_share_unclaimed() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        let b = set.add_row(EFF);
        set.apply(a, RowEdit::Percent(dec!(30)), EFF);
        set.apply(a, RowEdit::Locked(true), EFF);
        set.apply(b, RowEdit::Percent(dec!(70)), EFF);

        set.remove_row(b, EFF);

        // only the locked 30% row remains; the 70% is gone and nobody
        // absorbs it
        assert_eq!(set.len(), 1);
        assert_eq!(set.total_percent(), dec!(30));
        with_departments(&mut set);
        assert_eq!(
            set.validate_for_submit(),
            Err(AllocationError::TotalPercentOutOfRange { total: dec!(30) })
        );
    }

    #[test]
    fn rescale_rebases_values_and_keeps_percents() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        let b = set.add_row(EFF);
        set.apply(a, RowEdit::Percent(dec!(60)), EFF);
        set.apply(b, RowEdit::Percent(dec!(40)), EFF);

        set.rescale(dec!(2000));

        assert_eq!(set.row(a).unwrap().percent, dec!(60));
        assert_eq!(set.row(a).unwrap().value, dec!(1200));
        assert_eq!(set.row(b).unwrap().percent, dec!(40));
        assert_eq!(set.row(b).unwrap().value, dec!(800));
    }

    #[test]
    fn apply_suggestion_replaces_the_whole_set() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        set.add_row(EFF);
        set.add_row(EFF);

        let target = Recipient {
            company: "acme".to_string(),
            department: "logistics".to_string(),
            ..Default::default()
        };
        set.apply_suggestion(target, EFF);

        assert_eq!(set.len(), 1);
        let row = set.iter().next().unwrap();
        assert_eq!(row.recipient.department, "logistics");
        assert_eq!(row.percent, dec!(100));
        assert_eq!(row.value, EFF);
        assert!(!row.locked);
        // old handles are dead
        assert!(set.row(a).is_none());
    }

    #[test]
    fn row_ids_are_never_reused() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        let b = set.add_row(EFF);
        set.remove_row(b, EFF);
        let c = set.add_row(EFF);
        assert!(c > b);
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn validation_tolerates_one_percent_deviation() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        with_departments(&mut set);

        for (total, ok) in [
            (dec!(95), false),
            (dec!(102), false),
            (dec!(99.5), true),
            (dec!(100.8), true),
            (dec!(100), true),
        ] {
            set.apply(a, RowEdit::Percent(total), EFF);
            assert_eq!(set.validate_for_submit().is_ok(), ok, "total {}", total);
        }
    }

    #[test]
    fn validation_requires_department_on_every_row() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        let b = set.add_row(EFF);
        set.apply(
            a,
            RowEdit::Target(Recipient {
                company: "acme".to_string(),
                department: "marketing".to_string(),
                ..Default::default()
            }),
            EFF,
        );

        assert_eq!(
            set.validate_for_submit(),
            Err(AllocationError::MissingDepartment { row: 2 })
        );

        set.apply(
            b,
            RowEdit::Target(Recipient {
                company: "acme".to_string(),
                department: "operations".to_string(),
                ..Default::default()
            }),
            EFF,
        );
        assert!(set.validate_for_submit().is_ok());
    }

    #[test]
    fn submit_issues_collects_every_failure() {
        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        set.add_row(EFF);
        set.apply(a, RowEdit::Percent(dec!(10)), EFF);

        let issues = set.submit_issues();
        assert_eq!(issues.len(), 3);
        assert!(matches!(
            issues[0],
            AllocationError::TotalPercentOutOfRange { .. }
        ));
        assert_eq!(issues[1], AllocationError::MissingDepartment { row: 1 });
        assert_eq!(issues[2], AllocationError::MissingDepartment { row: 2 });
    }

    #[test]
    fn worked_example_from_the_invoice_form() {
        // gross 1190, VAT 19% subtracted: effective 1000
        let effective = effective_value(dec!(1190), true, Some(dec!(19)));
        assert_eq!(effective, dec!(1000));

        let mut set = AllocationSet::new("acme");
        let a = first_id(&set);
        let b = set.add_row(effective);
        set.apply(a, RowEdit::Percent(dec!(60)), effective);
        set.apply(b, RowEdit::Percent(dec!(40)), effective);
        assert_eq!(set.row(a).unwrap().value, dec!(600));
        assert_eq!(set.row(b).unwrap().value, dec!(400));

        set.add_row(effective);
        let third = dec!(100) / dec!(3);
        for row in set.iter() {
            assert_eq!(row.percent, third);
            assert!((row.value - dec!(333.33)).abs() < dec!(0.01));
        }
        assert!((set.total_percent() - dec!(100)).abs() < dec!(0.0001));
    }
}
