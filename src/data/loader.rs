use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::DataLoadError;
use super::model::{CustomerRecord, CustomerTable, Education, COLUMNS};

/// Leading metadata lines before the header row in the source CSV export
/// (title, blank line, sheet note).
const CSV_METADATA_LINES: usize = 3;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a customer table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the spreadsheet export: 3 metadata lines, then a header
///   row with the canonical column names
/// * `.json`    – records-oriented array: `[{ "ID": 1, "Age": 25, ... }]`
/// * `.parquet` – flat columns with the canonical names
pub fn load_file(path: &Path) -> Result<CustomerTable, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedExtension(other.to_string())),
    };

    Ok(CustomerTable::new(records, path.to_path_buf()))
}

static CACHE: Mutex<Option<(PathBuf, Arc<CustomerTable>)>> = Mutex::new(None);

/// Load through the process-wide cache. The canonical table is read once
/// per source path and shared read-only; switching paths reloads.
pub fn load_cached(path: &Path) -> Result<Arc<CustomerTable>, DataLoadError> {
    let mut guard = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some((cached_path, table)) = guard.as_ref() {
        if cached_path == path {
            return Ok(Arc::clone(table));
        }
    }
    let table = Arc::new(load_file(path)?);
    *guard = Some((path.to_path_buf(), Arc::clone(&table)));
    Ok(table)
}

/// Drop the cached table so the next `load_cached` re-reads the source.
pub fn invalidate_cache() {
    let mut guard = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    *guard = None;
}

// ---------------------------------------------------------------------------
// Raw row: every field as an optional number, before coercion
// ---------------------------------------------------------------------------

/// One row with each cell numerically coerced (or not). A row is published
/// only if *every* required field coerced; otherwise the whole row is
/// dropped, so the table never carries partial nulls.
#[derive(Debug, Default, Deserialize)]
struct RawRow {
    #[serde(rename = "ID")]
    id: Option<f64>,
    #[serde(rename = "Age")]
    age: Option<f64>,
    #[serde(rename = "Experience")]
    experience: Option<f64>,
    #[serde(rename = "Income")]
    income: Option<f64>,
    #[serde(rename = "Family")]
    family: Option<f64>,
    #[serde(rename = "CCAvg")]
    cc_avg: Option<f64>,
    #[serde(rename = "Education")]
    education: Option<f64>,
    #[serde(rename = "Mortgage")]
    mortgage: Option<f64>,
    #[serde(rename = "Personal Loan")]
    personal_loan: Option<f64>,
    #[serde(rename = "Securities Account")]
    securities_account: Option<f64>,
    #[serde(rename = "CD Account")]
    cd_account: Option<f64>,
    #[serde(rename = "Online")]
    online: Option<f64>,
    #[serde(rename = "CreditCard")]
    credit_card: Option<f64>,
}

impl RawRow {
    /// Keep-or-drop decision for the row. `None` means drop.
    fn coerce(&self) -> Option<CustomerRecord> {
        Some(CustomerRecord {
            id: u32::try_from(as_int(self.id?)?).ok()?,
            age: u32::try_from(as_int(self.age?)?).ok()?,
            experience: i32::try_from(as_int(self.experience?)?).ok()?,
            income: finite(self.income?)?,
            family_size: u32::try_from(as_int(self.family?)?).ok()?,
            cc_avg_spend: finite(self.cc_avg?)?,
            education: Education::from_code(as_int(self.education?)?)?,
            mortgage: finite(self.mortgage?)?,
            has_securities_account: self.securities_account? != 0.0,
            has_cd_account: self.cd_account? != 0.0,
            uses_online_banking: self.online? != 0.0,
            has_credit_card: self.credit_card? != 0.0,
            accepted_personal_loan: self.personal_loan? != 0.0,
        })
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Integral check: count-like columns must hold whole numbers.
fn as_int(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

fn collect_rows(rows: impl Iterator<Item = RawRow>) -> Vec<CustomerRecord> {
    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in rows {
        match row.coerce() {
            Some(rec) => records.push(rec),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::warn!("Dropped {dropped} rows with uncoercible values");
    }
    records
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<CustomerRecord>, DataLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(&text)
}

/// Parse the CSV body: skip the metadata lines, then the header row names
/// the columns (in any order).
pub(crate) fn parse_csv(text: &str) -> Result<Vec<CustomerRecord>, DataLoadError> {
    let mut lines = text.split_inclusive('\n');
    for _ in 0..CSV_METADATA_LINES {
        lines.next();
    }
    let body: String = lines.collect();

    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    // Column name → position, erroring on the first missing column.
    let mut positions = [0usize; COLUMNS.len()];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(DataLoadError::MissingColumn(name))?;
    }

    let mut raw_rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cell = |i: usize| parse_cell(record.get(positions[i]).unwrap_or(""));
        raw_rows.push(RawRow {
            id: cell(0),
            age: cell(1),
            experience: cell(2),
            income: cell(3),
            family: cell(4),
            cc_avg: cell(5),
            education: cell(6),
            mortgage: cell(7),
            personal_loan: cell(8),
            securities_account: cell(9),
            cd_account: cell(10),
            online: cell(11),
            credit_card: cell(12),
        });
    }

    Ok(collect_rows(raw_rows.into_iter()))
}

/// Lenient numeric coercion of a single cell; anything unparseable is
/// "missing" (and will drop the row).
fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "ID": 1, "Age": 25, "Income": 49.0, "Personal Loan": 0, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<CustomerRecord>, DataLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let root: JsonValue = serde_json::from_str(&text)?;
    let rows = root.as_array().ok_or(DataLoadError::JsonShape)?;

    // Column presence is checked against the first row; per-row gaps after
    // that are treated as missing values (row dropped), not schema errors.
    if let Some(first) = rows.first().and_then(|r| r.as_object()) {
        for name in COLUMNS {
            if !first.contains_key(name) {
                return Err(DataLoadError::MissingColumn(name));
            }
        }
    }

    let raw_rows: Vec<RawRow> = serde_json::from_value(root)?;
    Ok(collect_rows(raw_rows.into_iter()))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per table column. Works with
/// files written by both Pandas (`df.to_parquet()`) and this crate's
/// sample generator.
fn load_parquet(path: &Path) -> Result<Vec<CustomerRecord>, DataLoadError> {
    let file = std::fs::File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut raw_rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let mut columns = Vec::with_capacity(COLUMNS.len());
        for name in COLUMNS {
            let idx = schema
                .index_of(name)
                .map_err(|_| DataLoadError::MissingColumn(name))?;
            columns.push(batch.column(idx).clone());
        }

        for row in 0..batch.num_rows() {
            let cell = |i: usize| cell_f64(&columns[i], row);
            raw_rows.push(RawRow {
                id: cell(0),
                age: cell(1),
                experience: cell(2),
                income: cell(3),
                family: cell(4),
                cc_avg: cell(5),
                education: cell(6),
                mortgage: cell(7),
                personal_loan: cell(8),
                securities_account: cell(9),
                cd_account: cell(10),
                online: cell(11),
                credit_card: cell(12),
            });
        }
    }

    Ok(collect_rows(raw_rows.into_iter()))
}

/// Read one numeric cell from an Arrow column; nulls and non-numeric
/// dtypes become "missing".
fn cell_f64(col: &Arc<dyn Array>, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_csv(rows: &[&str]) -> String {
        let mut text = String::from(
            "Universal Bank customer extract\n\
             \n\
             Sheet: Data\n\
             ID,Age,Experience,Income,Family,CCAvg,Education,Mortgage,\
             Personal Loan,Securities Account,CD Account,Online,CreditCard\n",
        );
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn parses_well_formed_rows() {
        let text = sample_csv(&[
            "1,25,1,49,4,1.6,1,0,0,1,0,0,0",
            "2,45,19,34,3,1.5,1,0,0,1,0,0,0",
        ]);
        let records = parse_csv(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].age, 25);
        assert_eq!(records[0].income, 49.0);
        assert_eq!(records[0].education, Education::Undergrad);
        assert!(!records[0].accepted_personal_loan);
        assert!(records[0].has_securities_account);
    }

    #[test]
    fn drops_rows_with_uncoercible_cells() {
        let text = sample_csv(&[
            "1,25,1,49,4,1.6,1,0,0,1,0,0,0",
            "2,forty,19,34,3,1.5,1,0,0,1,0,0,0",
            "3,39,15,,1,1.0,1,0,0,0,0,0,0",
        ]);
        let records = parse_csv(&text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
    }

    #[test]
    fn rejects_unknown_education_codes() {
        let text = sample_csv(&[
            "1,25,1,49,4,1.6,7,0,0,1,0,0,0",
            "2,45,19,34,3,1.5,3,0,1,1,0,0,0",
        ]);
        let records = parse_csv(&text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].education, Education::Professional);
    }

    #[test]
    fn drops_rows_with_out_of_range_counts() {
        // A negative age must not wrap into a huge unsigned value; the
        // whole row goes, same as any other failed coercion.
        let text = sample_csv(&[
            "1,-25,1,49,4,1.6,1,0,0,1,0,0,0",
            "-2,25,1,49,4,1.6,1,0,0,1,0,0,0",
            "3,25,1,49,-4,1.6,1,0,0,1,0,0,0",
            "4,25,1,49,4,1.6,1,0,0,1,0,0,0",
        ]);
        let records = parse_csv(&text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 4);
        assert_eq!(records[0].age, 25);
    }

    #[test]
    fn keeps_negative_experience() {
        let text = sample_csv(&["1,23,-1,82,1,1.9,3,0,0,0,0,1,1"]);
        let records = parse_csv(&text).unwrap();
        assert_eq!(records[0].experience, -1);
    }

    #[test]
    fn missing_column_is_an_error() {
        let text = "meta\n\nmeta\nID,Age\n1,25\n";
        match parse_csv(text) {
            Err(DataLoadError::MissingColumn(name)) => assert_eq!(name, "Experience"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn loads_records_oriented_json() {
        let dir = std::env::temp_dir();
        let path = dir.join("loan_lens_loader_test.json");
        std::fs::write(
            &path,
            r#"[{"ID":1,"Age":30,"Experience":5,"Income":120.0,"Family":2,
                 "CCAvg":3.2,"Education":2,"Mortgage":0,"Personal Loan":1,
                 "Securities Account":0,"CD Account":1,"Online":1,"CreditCard":0}]"#,
        )
        .unwrap();
        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(table.len(), 1);
        let rec = &table.records[0];
        assert_eq!(rec.education, Education::Graduate);
        assert!(rec.accepted_personal_loan);
        assert!(rec.has_cd_account);
        assert!(!rec.has_credit_card);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = load_file(Path::new("customers.xls")).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedExtension(e) if e == "xls"));
    }
}
