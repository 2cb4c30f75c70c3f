use std::collections::BTreeMap;

use super::model::{CustomerTable, NumericField};

// ---------------------------------------------------------------------------
// Group-by statistics
// ---------------------------------------------------------------------------

/// Count / sum of one numeric field within a group. `mean()` is NaN for an
/// empty group; querying a group that matched nothing is never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupStats {
    pub count: usize,
    pub sum: f64,
}

impl GroupStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Fold `(key, value)` pairs into per-group statistics. Keys are returned
/// in sorted order so tables and bar charts are stable across recomputes.
pub fn grouped_stats<K, I>(pairs: I) -> BTreeMap<K, GroupStats>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut groups: BTreeMap<K, GroupStats> = BTreeMap::new();
    for (key, value) in pairs {
        groups.entry(key).or_default().push(value);
    }
    groups
}

/// Fraction of the view that accepted a personal loan; NaN when empty.
pub fn conversion_rate(table: &CustomerTable, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return f64::NAN;
    }
    let accepted = indices
        .iter()
        .filter(|&&i| table.records[i].accepted_personal_loan)
        .count();
    accepted as f64 / indices.len() as f64
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// describe()-style summary of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n−1 denominator); NaN for n < 2.
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summarise a slice. An empty slice yields count 0 and NaN everywhere;
/// callers render that as "no data".
pub fn describe(values: &[f64]) -> Summary {
    let count = values.len();
    if count == 0 {
        return Summary {
            count,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q1: f64::NAN,
            median: f64::NAN,
            q3: f64::NAN,
            max: f64::NAN,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = if count < 2 {
        f64::NAN
    } else {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    };

    Summary {
        count,
        mean,
        std,
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted[count - 1],
    }
}

/// Linearly interpolated quantile (R Type 7, the Pandas/NumPy default)
/// over an already-sorted slice. NaN for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * q;
            let lo = h.floor() as usize;
            let hi = h.ceil() as usize;
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}

/// IQR upper fence `Q3 + 1.5·(Q3 − Q1)`. A value is an outlier iff it
/// *strictly* exceeds the fence. NaN for an empty slice; tiny slices get
/// no special-casing, the same interpolation rule applies.
pub fn outlier_threshold(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    q3 + 1.5 * (q3 - q1)
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation of two equal-length slices. NaN when either side
/// has zero variance or fewer than two points.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let mx = xs[..n].iter().sum::<f64>() / n as f64;
    let my = ys[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x * var_y).sqrt()
}

/// Symmetric Pearson matrix over the chosen fields of the view.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub fields: Vec<NumericField>,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.fields.len() + j]
    }

    /// Correlations of every field against `target`, strongest first.
    /// NaN entries sort last.
    pub fn ranked_against(&self, target: NumericField) -> Vec<(NumericField, f64)> {
        let Some(t) = self.fields.iter().position(|&f| f == target) else {
            return Vec::new();
        };
        let mut ranked: Vec<(NumericField, f64)> = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, &f)| (f, self.get(i, t)))
            .collect();
        // total_cmp would rank NaN above +inf, so a plain descending sort
        // leads with the no-data fields; force them to the tail instead.
        ranked.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => b.1.total_cmp(&a.1),
        });
        ranked
    }
}

/// Compute the matrix for the current view. Each pair is computed once and
/// mirrored, so symmetry holds exactly; a diagonal entry is 1.0 when the
/// field has any variance and NaN otherwise.
pub fn correlation_matrix(
    table: &CustomerTable,
    indices: &[usize],
    fields: &[NumericField],
) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = fields
        .iter()
        .map(|&f| indices.iter().map(|&i| f.value(&table.records[i])).collect())
        .collect();

    let k = fields.len();
    let mut values = vec![f64::NAN; k * k];
    for i in 0..k {
        for j in i..k {
            let r = if i == j {
                let v = pearson(&columns[i], &columns[i]);
                if v.is_nan() { f64::NAN } else { 1.0 }
            } else {
                pearson(&columns[i], &columns[j])
            };
            values[i * k + j] = r;
            values[j * k + i] = r;
        }
    }

    CorrelationMatrix {
        fields: fields.to_vec(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Education;
    use crate::data::test_support::{record, table};

    #[test]
    fn grouped_stats_counts_sums_and_means() {
        let groups = grouped_stats([("a", 1.0), ("b", 10.0), ("a", 3.0)]);
        assert_eq!(groups["a"].count, 2);
        assert_eq!(groups["a"].sum, 4.0);
        assert_eq!(groups["a"].mean(), 2.0);
        assert_eq!(groups["b"].count, 1);
    }

    #[test]
    fn empty_group_mean_is_nan_not_a_panic() {
        assert!(GroupStats::default().mean().is_nan());
    }

    #[test]
    fn describe_matches_hand_computation() {
        let s = describe(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.count, 8);
        assert_eq!(s.mean, 5.0);
        // Sample std: ss = 32, 32/7 → sqrt ≈ 2.13809
        assert!((s.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.median, 4.5);
        assert_eq!(s.max, 9.0);
    }

    #[test]
    fn describe_of_singleton_has_nan_std() {
        let s = describe(&[3.0]);
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 3.0);
        assert!(s.std.is_nan());
        assert_eq!(s.median, 3.0);
    }

    #[test]
    fn describe_of_empty_is_all_nan() {
        let s = describe(&[]);
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan() && s.min.is_nan() && s.max.is_nan());
    }

    // Quantiles use linear interpolation (R Type 7) throughout; these pin
    // that convention.
    #[test]
    fn type7_quantiles() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.25), 1.75);
        assert_eq!(quantile_sorted(&sorted, 0.5), 2.5);
        assert_eq!(quantile_sorted(&sorted, 0.75), 3.25);
        assert_eq!(quantile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(quantile_sorted(&sorted, 1.0), 4.0);
    }

    #[test]
    fn outlier_threshold_matches_closed_form() {
        // n = 6: Q1 = 2.25, Q3 = 4.75, IQR = 2.5 → fence 8.5
        let fence = outlier_threshold(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        assert!((fence - 8.5).abs() < 1e-12);
    }

    #[test]
    fn tiny_inputs_use_the_same_interpolation_rule() {
        // Two values: Q1 = 1.25, Q3 = 1.75 → fence 2.5
        let fence = outlier_threshold(&[1.0, 2.0]);
        assert!((fence - 2.5).abs() < 1e-12);
        assert!(outlier_threshold(&[]).is_nan());
    }

    #[test]
    fn pearson_perfectly_linear() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);
        let neg = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &neg) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_zero_variance_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    fn sample_table() -> crate::data::model::CustomerTable {
        table(vec![
            record(1, 50.0, 1.0, Education::Undergrad, false),
            record(2, 100.0, 2.0, Education::Graduate, false),
            record(3, 150.0, 3.0, Education::Graduate, true),
            record(4, 200.0, 4.0, Education::Professional, true),
        ])
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let t = sample_table();
        let indices: Vec<usize> = (0..t.len()).collect();
        let m = correlation_matrix(&t, &indices, &NumericField::CORRELATION);
        let k = m.fields.len();
        for i in 0..k {
            for j in 0..k {
                let a = m.get(i, j);
                let b = m.get(j, i);
                assert!(a.is_nan() == b.is_nan());
                if !a.is_nan() {
                    assert_eq!(a, b);
                }
            }
        }
        // Income varies in the sample, so its self-correlation is exactly 1.
        let income = m.fields.iter().position(|&f| f == NumericField::Income).unwrap();
        assert_eq!(m.get(income, income), 1.0);
    }

    #[test]
    fn zero_variance_field_yields_nan_column() {
        let t = sample_table();
        let indices: Vec<usize> = (0..t.len()).collect();
        // Every sample record has has_cd_account = false → zero variance.
        let m = correlation_matrix(
            &t,
            &indices,
            &[NumericField::Income, NumericField::CdAccount],
        );
        assert!(m.get(0, 1).is_nan());
        assert!(m.get(1, 1).is_nan());
        assert_eq!(m.get(0, 0), 1.0);
    }

    #[test]
    fn ranking_puts_nan_correlations_last() {
        let t = sample_table();
        let indices: Vec<usize> = (0..t.len()).collect();
        // CdAccount is constant in the sample, so its correlation with
        // Income is NaN; it must trail every finite entry.
        let m = correlation_matrix(
            &t,
            &indices,
            &[
                NumericField::CdAccount,
                NumericField::Income,
                NumericField::CcAvg,
            ],
        );
        let ranked = m.ranked_against(NumericField::Income);
        assert_eq!(ranked[0].0, NumericField::Income);
        assert_eq!(ranked[0].1, 1.0);
        assert!(!ranked[1].1.is_nan());
        assert_eq!(ranked[2].0, NumericField::CdAccount);
        assert!(ranked[2].1.is_nan());
    }

    #[test]
    fn conversion_rate_over_view() {
        let t = sample_table();
        let all: Vec<usize> = (0..t.len()).collect();
        assert_eq!(conversion_rate(&t, &all), 0.5);
        assert!(conversion_rate(&t, &[]).is_nan());
    }
}
