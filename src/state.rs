use std::sync::Arc;

use crate::data::derive::{annotate, Derived};
use crate::data::filter::{filtered_indices, FilterCriteria};
use crate::data::model::{CustomerTable, NumericField};

// ---------------------------------------------------------------------------
// Dashboard sections
// ---------------------------------------------------------------------------

/// The analysis sections selectable in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Overview,
    IncomeAnalysis,
    CreditCardAnalysis,
    EducationAnalysis,
    VipSegment,
    CustomerTiers,
    DataExplorer,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Overview,
        Section::IncomeAnalysis,
        Section::CreditCardAnalysis,
        Section::EducationAnalysis,
        Section::VipSegment,
        Section::CustomerTiers,
        Section::DataExplorer,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::IncomeAnalysis => "Income Analysis",
            Section::CreditCardAnalysis => "Credit Card Analysis",
            Section::EducationAnalysis => "Education Analysis",
            Section::VipSegment => "VIP Segment",
            Section::CustomerTiers => "Customer Tiers",
            Section::DataExplorer => "Data Explorer",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. One recompute pass per
/// control change: filter → derive, both cached here until the next change.
pub struct AppState {
    /// Loaded dataset (None until the user opens a file). Shared read-only.
    pub dataset: Option<Arc<CustomerTable>>,

    /// Current sidebar filter parameters.
    pub criteria: FilterCriteria,

    /// Indices of records passing the current criteria (cached).
    pub visible_indices: Vec<usize>,

    /// Derived columns for the visible records, parallel to
    /// `visible_indices` (cached).
    pub derived: Vec<Derived>,

    /// Active dashboard section.
    pub section: Section,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            criteria: FilterCriteria::default(),
            visible_indices: Vec::new(),
            derived: Vec::new(),
            section: Section::default(),
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table and reset the filters to the default
    /// ranges, clamped to the data's actual span.
    pub fn set_dataset(&mut self, dataset: Arc<CustomerTable>) {
        let mut criteria = FilterCriteria::default();
        if let Some((lo, hi)) = dataset.field_range(NumericField::Income) {
            criteria.income = (40.0f64.clamp(lo, hi), 200.0f64.clamp(lo, hi));
        }
        if let Some((lo, hi)) = dataset.field_range(NumericField::CcAvg) {
            criteria.cc_avg = (0.0f64.clamp(lo, hi), 10.0f64.clamp(lo, hi));
        }
        self.criteria = criteria;
        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Recompute the working view after any criteria change: filter the
    /// table, then annotate the surviving rows.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.dataset {
            self.visible_indices = filtered_indices(table, &self.criteria);
            self.derived = annotate(table, &self.visible_indices);
        } else {
            self.visible_indices.clear();
            self.derived.clear();
        }
    }

    /// The working view as (table, indices), or None before any load.
    pub fn view(&self) -> Option<(&CustomerTable, &[usize])> {
        self.dataset
            .as_deref()
            .map(|t| (t, self.visible_indices.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Education;
    use crate::data::test_support::{record, table};

    #[test]
    fn refilter_keeps_indices_and_derived_in_lockstep() {
        let mut state = AppState::default();
        state.set_dataset(Arc::new(table(vec![
            record(1, 50.0, 1.0, Education::Undergrad, false),
            record(2, 160.0, 4.5, Education::Graduate, true),
            record(3, 210.0, 5.0, Education::Professional, true),
        ])));

        // Default income ceiling is 200, so record 3 is filtered out.
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.derived.len(), 2);

        state.criteria.income = (100.0, 300.0);
        state.refilter();
        assert_eq!(state.visible_indices, vec![1, 2]);
        assert_eq!(state.derived.len(), 2);
        assert_eq!(state.derived[0].tier, crate::data::derive::Tier::Vip);
    }
}
