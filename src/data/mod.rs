/// Data layer: the filtering + segmentation + aggregation engine.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CustomerTable (cached per source path)
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ CustomerTable  │  Vec<CustomerRecord>, read-only after load
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterCriteria → view indices
///   └──────────┘
///        │
///        ├────────────┬─────────────┐
///        ▼            ▼             ▼
///   ┌──────────┐ ┌──────────┐ ┌──────────┐
///   │  derive   │ │  stats    │ │  export   │
///   └──────────┘ └──────────┘ └──────────┘
///    brackets,     group-by,     CSV bytes
///    tiers, VIP    describe,
///    segments      correlation
/// ```
///
/// Everything below `loader` is pure: the same table and criteria always
/// produce the same view, derived columns, and aggregates.

pub mod derive;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use super::model::{CustomerRecord, CustomerTable, Education};

    /// A record with the fields the engine branches on; everything else
    /// gets neutral values.
    pub fn record(
        id: u32,
        income: f64,
        cc_avg_spend: f64,
        education: Education,
        accepted_personal_loan: bool,
    ) -> CustomerRecord {
        CustomerRecord {
            id,
            age: 35,
            experience: 10,
            income,
            family_size: 2,
            cc_avg_spend,
            education,
            mortgage: 0.0,
            has_securities_account: false,
            has_cd_account: false,
            uses_online_banking: true,
            has_credit_card: false,
            accepted_personal_loan,
        }
    }

    pub fn table(records: Vec<CustomerRecord>) -> CustomerTable {
        CustomerTable::new(records, PathBuf::from("test://in-memory"))
    }
}
