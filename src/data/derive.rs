use std::fmt;

use super::model::{CustomerRecord, CustomerTable, Education};
use super::stats::outlier_threshold;

// ---------------------------------------------------------------------------
// Income brackets
// ---------------------------------------------------------------------------

/// Income bracket over the fixed edges 0 / 40 / 80 / 120 / 160 / 224.
/// Bins are half-open `(lo, hi]` — a value on a boundary belongs to the
/// bracket whose upper edge it equals — except the first bin, which also
/// includes 0. Values above 224 land in the last bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IncomeBracket {
    Under40,
    From40To80,
    From80To120,
    From120To160,
    Over160,
}

impl IncomeBracket {
    pub const ALL: [IncomeBracket; 5] = [
        IncomeBracket::Under40,
        IncomeBracket::From40To80,
        IncomeBracket::From80To120,
        IncomeBracket::From120To160,
        IncomeBracket::Over160,
    ];

    pub fn from_income(income: f64) -> Self {
        if income <= 40.0 {
            IncomeBracket::Under40
        } else if income <= 80.0 {
            IncomeBracket::From40To80
        } else if income <= 120.0 {
            IncomeBracket::From80To120
        } else if income <= 160.0 {
            IncomeBracket::From120To160
        } else {
            IncomeBracket::Over160
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncomeBracket::Under40 => "<$40k",
            IncomeBracket::From40To80 => "$40-80k",
            IncomeBracket::From80To120 => "$80-120k",
            IncomeBracket::From120To160 => "$120-160k",
            IncomeBracket::Over160 => ">$160k",
        }
    }
}

impl fmt::Display for IncomeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// 3-tier exhaustive model
// ---------------------------------------------------------------------------

/// Marketing tier. Every record gets exactly one label; rules overlap, so
/// the evaluation order in [`Tier::assign`] decides ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Vip,
    Core,
    Secondary,
    DoNotPursue,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Vip, Tier::Core, Tier::Secondary, Tier::DoNotPursue];

    /// Assign a tier by the fixed priority chain, first match wins.
    pub fn assign(rec: &CustomerRecord) -> Tier {
        let advanced_degree = matches!(rec.education, Education::Graduate | Education::Professional);

        if rec.income >= 150.0 && rec.cc_avg_spend >= 4.0 && advanced_degree {
            return Tier::Vip;
        }
        if (100.0..150.0).contains(&rec.income) && rec.cc_avg_spend >= 2.0 && advanced_degree {
            return Tier::Core;
        }
        if rec.income >= 80.0 && rec.cc_avg_spend >= 1.0 {
            return Tier::Secondary;
        }
        Tier::DoNotPursue
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Vip => "Tier 1: VIP",
            Tier::Core => "Tier 2: Core",
            Tier::Secondary => "Tier 3: Secondary",
            Tier::DoNotPursue => "Do Not Pursue",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Derived columns over the working view
// ---------------------------------------------------------------------------

/// Columns computed per row of the filtered view. Never stored on the
/// canonical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derived {
    pub bracket: IncomeBracket,
    pub education_label: &'static str,
    pub tier: Tier,
}

/// Annotate the filtered view: one `Derived` per entry of `indices`,
/// in the same order. Pure and idempotent.
pub fn annotate(table: &CustomerTable, indices: &[usize]) -> Vec<Derived> {
    indices
        .iter()
        .map(|&i| {
            let rec = &table.records[i];
            Derived {
                bracket: IncomeBracket::from_income(rec.income),
                education_label: rec.education.label(),
                tier: Tier::assign(rec),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// VIP segments (overlapping, reported independently)
// ---------------------------------------------------------------------------

/// Tier-1 VIP: top income, top spend, advanced degree.
pub fn is_vip_tier1(rec: &CustomerRecord) -> bool {
    rec.income >= 150.0
        && rec.cc_avg_spend >= 4.0
        && matches!(rec.education, Education::Graduate | Education::Professional)
}

/// Tier-2 core target: upper-middle income and spend, advanced degree.
pub fn is_vip_tier2(rec: &CustomerRecord) -> bool {
    (100.0..150.0).contains(&rec.income)
        && (2.0..4.0).contains(&rec.cc_avg_spend)
        && matches!(rec.education, Education::Graduate | Education::Professional)
}

/// The three VIP segments over the current view, as index lists into the
/// table. "High spenders" is the IQR-fence outlier set on `cc_avg_spend`
/// computed over *this* view, so it shifts with the filters.
#[derive(Debug, Clone, Default)]
pub struct VipSegments {
    pub tier1: Vec<usize>,
    pub tier2: Vec<usize>,
    pub high_spenders: Vec<usize>,
    /// The fence used for `high_spenders` (NaN when the view is empty).
    pub spend_threshold: f64,
}

pub fn vip_segments(table: &CustomerTable, indices: &[usize]) -> VipSegments {
    let spend: Vec<f64> = indices
        .iter()
        .map(|&i| table.records[i].cc_avg_spend)
        .collect();
    let threshold = outlier_threshold(&spend);

    let mut segments = VipSegments {
        spend_threshold: threshold,
        ..VipSegments::default()
    };

    for &i in indices {
        let rec = &table.records[i];
        if is_vip_tier1(rec) {
            segments.tier1.push(i);
        }
        if is_vip_tier2(rec) {
            segments.tier2.push(i);
        }
        // Strictly above the fence counts as an outlier.
        if rec.cc_avg_spend > threshold {
            segments.high_spenders.push(i);
        }
    }
    segments
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{record, table};

    #[test]
    fn bracket_boundaries_are_right_inclusive() {
        assert_eq!(IncomeBracket::from_income(0.0), IncomeBracket::Under40);
        assert_eq!(IncomeBracket::from_income(40.0), IncomeBracket::Under40);
        assert_eq!(IncomeBracket::from_income(40.1), IncomeBracket::From40To80);
        assert_eq!(IncomeBracket::from_income(80.0), IncomeBracket::From40To80);
        assert_eq!(IncomeBracket::from_income(120.0), IncomeBracket::From80To120);
        assert_eq!(IncomeBracket::from_income(160.0), IncomeBracket::From120To160);
        assert_eq!(IncomeBracket::from_income(224.0), IncomeBracket::Over160);
        assert_eq!(IncomeBracket::from_income(500.0), IncomeBracket::Over160);
    }

    #[test]
    fn tier_assignment_is_total() {
        let samples = [
            record(1, 200.0, 5.0, Education::Professional, false),
            record(2, 120.0, 2.5, Education::Graduate, false),
            record(3, 90.0, 1.5, Education::Undergrad, false),
            record(4, 20.0, 0.2, Education::Undergrad, false),
        ];
        let expected = [Tier::Vip, Tier::Core, Tier::Secondary, Tier::DoNotPursue];
        for (rec, want) in samples.iter().zip(expected) {
            assert_eq!(Tier::assign(rec), want);
        }
    }

    #[test]
    fn priority_order_decides_overlaps() {
        // Matches both the VIP rule and the Secondary rule; the chain must
        // stop at VIP.
        let rec = record(1, 160.0, 4.5, Education::Graduate, false);
        assert_eq!(Tier::assign(&rec), Tier::Vip);

        // High income + spend but undergrad: falls through to Secondary.
        let rec = record(2, 160.0, 4.5, Education::Undergrad, false);
        assert_eq!(Tier::assign(&rec), Tier::Secondary);

        // Core band income but spend ≥ 4 still belongs to Core (the upper
        // spend bound only exists in the overlapping VIP-tier2 segment).
        let rec = record(3, 120.0, 5.0, Education::Graduate, false);
        assert_eq!(Tier::assign(&rec), Tier::Core);
    }

    #[test]
    fn annotate_is_idempotent_and_ordered() {
        let table = table(vec![
            record(1, 30.0, 0.5, Education::Undergrad, false),
            record(2, 155.0, 4.2, Education::Graduate, true),
        ]);
        let indices = [0usize, 1];
        let once = annotate(&table, &indices);
        let twice = annotate(&table, &indices);
        assert_eq!(once, twice);
        assert_eq!(once[0].tier, Tier::DoNotPursue);
        assert_eq!(once[1].tier, Tier::Vip);
        assert_eq!(once[1].education_label, "Graduate");
        assert_eq!(once[1].bracket, IncomeBracket::From120To160);
    }

    #[test]
    fn vip_tier2_spend_band_is_half_open() {
        let rec = record(1, 120.0, 4.0, Education::Graduate, false);
        assert!(!is_vip_tier2(&rec));
        let rec = record(2, 120.0, 2.0, Education::Graduate, false);
        assert!(is_vip_tier2(&rec));
        let rec = record(3, 150.0, 3.0, Education::Graduate, false);
        assert!(!is_vip_tier2(&rec));
    }

    #[test]
    fn vip_segments_may_overlap() {
        let table = table(vec![
            // Tier-1 and (with the spend outlier fence from this tiny view)
            // also a high spender.
            record(1, 200.0, 9.0, Education::Professional, true),
            record(2, 120.0, 2.5, Education::Graduate, false),
            record(3, 60.0, 1.0, Education::Undergrad, false),
            record(4, 60.0, 1.1, Education::Undergrad, false),
            record(5, 60.0, 1.2, Education::Undergrad, false),
        ]);
        let indices: Vec<usize> = (0..table.len()).collect();
        let segments = vip_segments(&table, &indices);
        assert_eq!(segments.tier1, vec![0]);
        assert_eq!(segments.tier2, vec![1]);
        assert!(segments.high_spenders.contains(&0));
    }

    #[test]
    fn empty_view_yields_empty_segments() {
        let table = table(vec![]);
        let segments = vip_segments(&table, &[]);
        assert!(segments.tier1.is_empty());
        assert!(segments.high_spenders.is_empty());
        assert!(segments.spend_threshold.is_nan());
    }
}
