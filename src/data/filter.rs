use std::collections::BTreeSet;

use super::model::{CustomerRecord, CustomerTable, Education};

// ---------------------------------------------------------------------------
// Filter criteria: two inclusive ranges and two membership sets
// ---------------------------------------------------------------------------

/// The sidebar filter parameters. Rebuilt on every control change; a
/// record passes iff all four predicates hold.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Annual income range in $k, inclusive both ends.
    pub income: (f64, f64),
    /// Monthly CC spend range in $k, inclusive both ends.
    pub cc_avg: (f64, f64),
    /// Accepted education levels. Empty set matches nothing.
    pub education: BTreeSet<Education>,
    /// Accepted loan statuses (`true` = accepted a personal loan).
    pub loan_status: BTreeSet<bool>,
}

impl Default for FilterCriteria {
    /// Wide-open criteria: every finite income/spend value and all
    /// education levels / loan statuses pass.
    fn default() -> Self {
        FilterCriteria {
            income: (f64::NEG_INFINITY, f64::INFINITY),
            cc_avg: (f64::NEG_INFINITY, f64::INFINITY),
            education: Education::ALL.into_iter().collect(),
            loan_status: [false, true].into_iter().collect(),
        }
    }
}

impl FilterCriteria {
    /// Whether a single record passes all four predicates.
    pub fn matches(&self, rec: &CustomerRecord) -> bool {
        let (income_lo, income_hi) = self.income;
        let (cc_lo, cc_hi) = self.cc_avg;
        rec.income >= income_lo
            && rec.income <= income_hi
            && rec.cc_avg_spend >= cc_lo
            && rec.cc_avg_spend <= cc_hi
            && self.education.contains(&rec.education)
            && self.loan_status.contains(&rec.accepted_personal_loan)
    }
}

/// Return indices of records that pass the criteria, preserving the
/// table's row order (so head-of-table previews are reproducible).
///
/// A degenerate range (lo > hi) simply matches nothing; it is not an
/// error. Downstream statistics must accept the resulting empty view.
pub fn filtered_indices(table: &CustomerTable, criteria: &FilterCriteria) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{record, table};

    fn criteria(
        income: (f64, f64),
        cc_avg: (f64, f64),
        education: &[Education],
        loan: &[bool],
    ) -> FilterCriteria {
        FilterCriteria {
            income,
            cc_avg,
            education: education.iter().copied().collect(),
            loan_status: loan.iter().copied().collect(),
        }
    }

    #[test]
    fn output_is_subset_and_satisfies_all_predicates() {
        let table = table(vec![
            record(1, 50.0, 1.0, Education::Undergrad, false),
            record(2, 120.0, 2.5, Education::Graduate, true),
            record(3, 160.0, 5.0, Education::Professional, false),
            record(4, 90.0, 0.5, Education::Graduate, false),
        ]);
        let c = criteria(
            (80.0, 200.0),
            (1.0, 6.0),
            &[Education::Graduate, Education::Professional],
            &[false, true],
        );
        let idx = filtered_indices(&table, &c);
        assert_eq!(idx, vec![1, 2]);
        for &i in &idx {
            assert!(c.matches(&table.records[i]));
        }
    }

    #[test]
    fn bounds_are_inclusive_on_both_ends() {
        let table = table(vec![
            record(1, 100.0, 2.0, Education::Graduate, false),
            record(2, 200.0, 4.0, Education::Graduate, false),
        ]);
        let c = criteria((100.0, 200.0), (2.0, 4.0), &Education::ALL, &[false, true]);
        assert_eq!(filtered_indices(&table, &c).len(), 2);
    }

    #[test]
    fn degenerate_range_yields_empty_not_error() {
        let table = table(vec![
            record(1, 100.0, 2.0, Education::Graduate, false),
            record(2, 150.0, 3.0, Education::Graduate, true),
        ]);
        let c = criteria((200.0, 100.0), (0.0, 10.0), &Education::ALL, &[false, true]);
        assert!(filtered_indices(&table, &c).is_empty());
    }

    #[test]
    fn empty_membership_set_matches_nothing() {
        let table = table(vec![record(1, 100.0, 2.0, Education::Graduate, false)]);
        let c = criteria((0.0, 1000.0), (0.0, 10.0), &[], &[false, true]);
        assert!(filtered_indices(&table, &c).is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let table = table(vec![
            record(5, 100.0, 2.0, Education::Graduate, false),
            record(3, 110.0, 2.0, Education::Graduate, false),
            record(9, 120.0, 2.0, Education::Graduate, false),
        ]);
        let c = FilterCriteria::default();
        assert_eq!(filtered_indices(&table, &c), vec![0, 1, 2]);
    }

    #[test]
    fn end_to_end_income_slice_and_conversion_rate() {
        // 10-row synthetic table with hand-checked expectations.
        let incomes = [30.0, 100.0, 150.0, 200.0, 99.9, 120.0, 201.0, 180.0, 45.0, 110.0];
        let loans = [false, true, false, true, true, false, true, true, false, false];
        let records: Vec<_> = incomes
            .iter()
            .zip(loans)
            .enumerate()
            .map(|(i, (&income, loan))| record(i as u32 + 1, income, 2.0, Education::Graduate, loan))
            .collect();
        let table = table(records);

        let c = criteria((100.0, 200.0), (0.0, 10.0), &Education::ALL, &[false, true]);
        let idx = filtered_indices(&table, &c);
        let ids: Vec<u32> = idx.iter().map(|&i| table.records[i].id).collect();
        assert_eq!(ids, vec![2, 3, 4, 6, 8, 10]);

        // Conversion rate over the slice: loans accepted by IDs 2, 4, 8.
        let accepted = idx
            .iter()
            .filter(|&&i| table.records[i].accepted_personal_loan)
            .count();
        let rate = accepted as f64 / idx.len() as f64;
        assert!((rate - 0.5).abs() < 1e-12);
    }
}
