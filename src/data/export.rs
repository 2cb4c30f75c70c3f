use super::model::{CustomerRecord, CustomerTable, COLUMNS};

// ---------------------------------------------------------------------------
// CSV export of the filtered view
// ---------------------------------------------------------------------------

/// Serialise the view as UTF-8 CSV: canonical header row, one row per
/// visible record, in view order. Floats use Rust's shortest round-trip
/// formatting, so `parse(export(view)) == view` field for field. Booleans
/// are written 0/1 and education as its numeric code, matching the source
/// file's encoding.
pub fn export_csv(table: &CustomerTable, indices: &[usize]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;

    for &i in indices {
        writer.write_record(csv_row(&table.records[i]))?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn csv_row(rec: &CustomerRecord) -> [String; COLUMNS.len()] {
    let flag = |b: bool| if b { "1" } else { "0" }.to_string();
    [
        rec.id.to_string(),
        rec.age.to_string(),
        rec.experience.to_string(),
        rec.income.to_string(),
        rec.family_size.to_string(),
        rec.cc_avg_spend.to_string(),
        rec.education.code().to_string(),
        rec.mortgage.to_string(),
        flag(rec.accepted_personal_loan),
        flag(rec.has_securities_account),
        flag(rec.has_cd_account),
        flag(rec.uses_online_banking),
        flag(rec.has_credit_card),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, FilterCriteria};
    use crate::data::loader::parse_csv;
    use crate::data::model::Education;
    use crate::data::test_support::{record, table};

    #[test]
    fn header_row_uses_canonical_column_names() {
        let t = table(vec![]);
        let bytes = export_csv(&t, &[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "ID,Age,Experience,Income,Family,CCAvg,Education,Mortgage,\
             Personal Loan,Securities Account,CD Account,Online,CreditCard"
        );
    }

    #[test]
    fn round_trips_through_the_csv_loader() {
        let t = table(vec![
            record(1, 49.25, 1.6, Education::Undergrad, false),
            record(2, 120.0, 2.5, Education::Graduate, true),
            record(3, 199.987, 8.125, Education::Professional, true),
        ]);
        let mut criteria = FilterCriteria::default();
        criteria.income = (100.0, 200.0);
        let indices = filtered_indices(&t, &criteria);
        let filtered: Vec<_> = indices.iter().map(|&i| t.records[i].clone()).collect();

        let bytes = export_csv(&t, &indices).unwrap();
        // The loader skips three metadata lines; the export has none.
        let text = format!("\n\n\n{}", String::from_utf8(bytes).unwrap());
        let reparsed = parse_csv(&text).unwrap();

        assert_eq!(reparsed, filtered);
    }

    #[test]
    fn rows_follow_view_order() {
        let t = table(vec![
            record(7, 50.0, 1.0, Education::Undergrad, false),
            record(2, 60.0, 1.0, Education::Undergrad, false),
        ]);
        let bytes = export_csv(&t, &[1, 0]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let ids: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["2", "7"]);
    }
}
