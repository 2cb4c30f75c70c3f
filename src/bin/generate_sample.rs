use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn bernoulli(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

#[derive(Clone)]
struct Row {
    id: i64,
    age: i64,
    experience: i64,
    income: f64,
    family: i64,
    cc_avg: f64,
    education: i64,
    mortgage: f64,
    personal_loan: i64,
    securities: i64,
    cd_account: i64,
    online: i64,
    credit_card: i64,
}

fn generate_row(id: i64, rng: &mut SimpleRng) -> Row {
    let age = rng.gauss(45.0, 11.0).clamp(23.0, 67.0).round();
    // Experience tracks age minus schooling, with a little noise; small
    // negatives survive on purpose, like the real extract.
    let experience = (age - 23.0 + rng.gauss(0.0, 1.5)).round().max(-3.0);

    let income = rng.gauss(4.2, 0.55).exp().clamp(8.0, 224.0).round();
    let family = 1 + (rng.next_u64() % 4) as i64;

    let cc_avg = ((income / 55.0) * rng.gauss(1.0, 0.4).abs()).clamp(0.0, 10.0);
    let cc_avg = (cc_avg * 100.0).round() / 100.0;

    let education = match rng.next_f64() {
        p if p < 0.42 => 1,
        p if p < 0.70 => 2,
        _ => 3,
    };

    let mortgage = if rng.bernoulli(0.69) {
        0.0
    } else {
        rng.gauss(140.0, 90.0).clamp(30.0, 635.0).round()
    };

    let securities = rng.bernoulli(0.10) as i64;
    let cd_account = rng.bernoulli(0.06) as i64;
    let online = rng.bernoulli(0.60) as i64;
    let credit_card = rng.bernoulli(0.29) as i64;

    // Acceptance odds rise with income, spend, and education, echoing the
    // patterns the dashboard is meant to surface.
    let mut p = 0.01;
    if income >= 100.0 {
        p += 0.08;
    }
    if income >= 150.0 {
        p += 0.14;
    }
    if cc_avg >= 4.0 {
        p += 0.10;
    }
    if education >= 2 {
        p += 0.06;
    }
    if cd_account == 1 {
        p += 0.25;
    }
    let personal_loan = rng.bernoulli(p) as i64;

    Row {
        id,
        age: age as i64,
        experience: experience as i64,
        income,
        family,
        cc_avg,
        education,
        mortgage,
        personal_loan,
        securities,
        cd_account,
        online,
        credit_card,
    }
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut text = String::from(
        "Universal Bank customer dataset (synthetic)\n\
         Generated by loan-lens generate_sample, seed 42\n\
         Sheet: Data\n",
    );
    {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "ID", "Age", "Experience", "Income", "Family", "CCAvg", "Education", "Mortgage",
            "Personal Loan", "Securities Account", "CD Account", "Online", "CreditCard",
        ])?;
        for r in rows {
            writer.write_record([
                r.id.to_string(),
                r.age.to_string(),
                r.experience.to_string(),
                r.income.to_string(),
                r.family.to_string(),
                r.cc_avg.to_string(),
                r.education.to_string(),
                r.mortgage.to_string(),
                r.personal_loan.to_string(),
                r.securities.to_string(),
                r.cd_account.to_string(),
                r.online.to_string(),
                r.credit_card.to_string(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| e.into_error())
            .context("flushing CSV writer")?;
        text.push_str(&String::from_utf8(bytes).context("CSV output was not UTF-8")?);
    }
    std::fs::write(path, text).with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let int_col = |f: fn(&Row) -> i64| Int64Array::from(rows.iter().map(f).collect::<Vec<_>>());
    let float_col = |f: fn(&Row) -> f64| Float64Array::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("ID", DataType::Int64, false),
        Field::new("Age", DataType::Int64, false),
        Field::new("Experience", DataType::Int64, false),
        Field::new("Income", DataType::Float64, false),
        Field::new("Family", DataType::Int64, false),
        Field::new("CCAvg", DataType::Float64, false),
        Field::new("Education", DataType::Int64, false),
        Field::new("Mortgage", DataType::Float64, false),
        Field::new("Personal Loan", DataType::Int64, false),
        Field::new("Securities Account", DataType::Int64, false),
        Field::new("CD Account", DataType::Int64, false),
        Field::new("Online", DataType::Int64, false),
        Field::new("CreditCard", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(int_col(|r| r.id)),
            Arc::new(int_col(|r| r.age)),
            Arc::new(int_col(|r| r.experience)),
            Arc::new(float_col(|r| r.income)),
            Arc::new(int_col(|r| r.family)),
            Arc::new(float_col(|r| r.cc_avg)),
            Arc::new(int_col(|r| r.education)),
            Arc::new(float_col(|r| r.mortgage)),
            Arc::new(int_col(|r| r.personal_loan)),
            Arc::new(int_col(|r| r.securities)),
            Arc::new(int_col(|r| r.cd_account)),
            Arc::new(int_col(|r| r.online)),
            Arc::new(int_col(|r| r.credit_card)),
        ],
    )
    .context("assembling record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let n: i64 = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(5000);

    let rows: Vec<Row> = (1..=n).map(|id| generate_row(id, &mut rng)).collect();

    write_csv(&rows, "sample_customers.csv")?;
    write_parquet(&rows, "sample_customers.parquet")?;

    let accepted: i64 = rows.iter().map(|r| r.personal_loan).sum();
    println!(
        "Wrote {n} customers ({accepted} loan acceptors) to sample_customers.csv / .parquet"
    );
    Ok(())
}
