use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Education – the three-level education code from the source data
// ---------------------------------------------------------------------------

/// Education level, encoded 1/2/3 in the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Education {
    Undergrad,
    Graduate,
    Professional,
}

impl Education {
    pub const ALL: [Education; 3] = [
        Education::Undergrad,
        Education::Graduate,
        Education::Professional,
    ];

    /// Decode the numeric education code. Unknown codes are rejected,
    /// never defaulted.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Education::Undergrad),
            2 => Some(Education::Graduate),
            3 => Some(Education::Professional),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Education::Undergrad => 1,
            Education::Graduate => 2,
            Education::Professional => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Education::Undergrad => "Undergrad",
            Education::Graduate => "Graduate",
            Education::Professional => "Professional",
        }
    }
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CustomerRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single bank customer (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub id: u32,
    pub age: u32,
    /// Years of professional experience. The source data contains a few
    /// small negative values; they are kept as-is.
    pub experience: i32,
    /// Annual income in $k.
    pub income: f64,
    pub family_size: u32,
    /// Average monthly credit-card spend in $k.
    pub cc_avg_spend: f64,
    pub education: Education,
    /// Mortgage value in $k (0 when none).
    pub mortgage: f64,
    pub has_securities_account: bool,
    pub has_cd_account: bool,
    pub uses_online_banking: bool,
    pub has_credit_card: bool,
    pub accepted_personal_loan: bool,
}

// ---------------------------------------------------------------------------
// NumericField – field selector for statistics and correlation
// ---------------------------------------------------------------------------

/// Numeric view of a record field, used by the aggregation engine to pick
/// columns for describe() and the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Age,
    Experience,
    Income,
    Family,
    CcAvg,
    Mortgage,
    PersonalLoan,
    CdAccount,
}

impl NumericField {
    /// Fields shown in the summary-statistics table.
    pub const DESCRIBE: [NumericField; 6] = [
        NumericField::Age,
        NumericField::Experience,
        NumericField::Income,
        NumericField::Family,
        NumericField::CcAvg,
        NumericField::Mortgage,
    ];

    /// Fields entering the correlation matrix.
    pub const CORRELATION: [NumericField; 8] = [
        NumericField::Age,
        NumericField::Experience,
        NumericField::Income,
        NumericField::Family,
        NumericField::CcAvg,
        NumericField::Mortgage,
        NumericField::PersonalLoan,
        NumericField::CdAccount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::Age => "Age",
            NumericField::Experience => "Experience",
            NumericField::Income => "Income",
            NumericField::Family => "Family",
            NumericField::CcAvg => "CCAvg",
            NumericField::Mortgage => "Mortgage",
            NumericField::PersonalLoan => "Personal Loan",
            NumericField::CdAccount => "CD Account",
        }
    }

    pub fn value(self, rec: &CustomerRecord) -> f64 {
        match self {
            NumericField::Age => rec.age as f64,
            NumericField::Experience => rec.experience as f64,
            NumericField::Income => rec.income,
            NumericField::Family => rec.family_size as f64,
            NumericField::CcAvg => rec.cc_avg_spend,
            NumericField::Mortgage => rec.mortgage,
            NumericField::PersonalLoan => rec.accepted_personal_loan as u8 as f64,
            NumericField::CdAccount => rec.has_cd_account as u8 as f64,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CustomerTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Column headers as they appear in the source file (embedded spaces and
/// all). Also the header row of CSV exports.
pub const COLUMNS: [&str; 13] = [
    "ID",
    "Age",
    "Experience",
    "Income",
    "Family",
    "CCAvg",
    "Education",
    "Mortgage",
    "Personal Loan",
    "Securities Account",
    "CD Account",
    "Online",
    "CreditCard",
];

/// The full parsed dataset. Read-only after load; shared behind an `Arc`
/// so filter recomputes never copy it.
#[derive(Debug, Clone)]
pub struct CustomerTable {
    pub records: Vec<CustomerRecord>,
    /// Where the table was loaded from (cache key).
    pub source: PathBuf,
}

impl CustomerTable {
    pub fn new(records: Vec<CustomerRecord>, source: PathBuf) -> Self {
        CustomerTable { records, source }
    }

    /// Number of customers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Min/max of a numeric field over the whole table, for slider bounds.
    /// `None` when the table is empty.
    pub fn field_range(&self, field: NumericField) -> Option<(f64, f64)> {
        let mut iter = self.records.iter().map(|r| field.value(r));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
