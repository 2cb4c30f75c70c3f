use eframe::egui::{self, Grid, RichText, ScrollArea, Ui};

use crate::color;
use crate::data::derive::{vip_segments, Tier};
use crate::data::model::{CustomerTable, Education, NumericField};
use crate::data::stats::{
    conversion_rate, correlation_matrix, describe, grouped_stats, GroupStats,
};
use crate::state::{AppState, Section};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// Central panel dispatch
// ---------------------------------------------------------------------------

/// Render the active dashboard section over the current filtered view.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a customer file to start  (File → Open…)");
        });
        return;
    }

    ui.heading(state.section.title());
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.section {
            Section::Overview => overview(ui, state),
            Section::IncomeAnalysis => income_analysis(ui, state),
            Section::CreditCardAnalysis => credit_card_analysis(ui, state),
            Section::EducationAnalysis => education_analysis(ui, state),
            Section::VipSegment => vip_segment(ui, state),
            Section::CustomerTiers => customer_tiers(ui, state),
            Section::DataExplorer => data_explorer(ui, state),
        });
}

// ---------------------------------------------------------------------------
// Formatting helpers: NaN always renders as "--", never crashes
// ---------------------------------------------------------------------------

fn pct(v: f64) -> String {
    if v.is_nan() {
        "--".to_string()
    } else {
        format!("{:.1}%", v * 100.0)
    }
}

fn money_k(v: f64, decimals: usize) -> String {
    if v.is_nan() {
        "--".to_string()
    } else {
        format!("${v:.decimals$}k")
    }
}

fn num(v: f64) -> String {
    if v.is_nan() {
        "--".to_string()
    } else {
        format!("{v:.2}")
    }
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.small(label);
        ui.label(RichText::new(value).heading());
    });
}

fn mean_of(table: &CustomerTable, indices: &[usize], field: NumericField) -> f64 {
    let mut g = GroupStats::default();
    for &i in indices {
        g.push(field.value(&table.records[i]));
    }
    g.mean()
}

fn values_of(table: &CustomerTable, indices: &[usize], field: NumericField) -> Vec<f64> {
    indices
        .iter()
        .map(|&i| field.value(&table.records[i]))
        .collect()
}

/// Split the view by loan status: (no_loan, accepted).
fn split_by_loan(table: &CustomerTable, indices: &[usize]) -> (Vec<usize>, Vec<usize>) {
    indices
        .iter()
        .copied()
        .partition(|&i| !table.records[i].accepted_personal_loan)
}

// ---------------------------------------------------------------------------
// Section 1: Overview
// ---------------------------------------------------------------------------

fn overview(ui: &mut Ui, state: &AppState) {
    let Some((table, indices)) = state.view() else {
        return;
    };
    let all: Vec<usize> = (0..table.len()).collect();

    ui.columns(5, |cols| {
        metric(&mut cols[0], "Total Customers", table.len().to_string());
        metric(
            &mut cols[1],
            "Loan Rate (all)",
            pct(conversion_rate(table, &all)),
        );
        metric(
            &mut cols[2],
            "Avg Income (all)",
            money_k(mean_of(table, &all, NumericField::Income), 0),
        );
        metric(
            &mut cols[3],
            "Avg CC Spending (all)",
            money_k(mean_of(table, &all, NumericField::CcAvg), 2),
        );
        let share = if table.is_empty() {
            f64::NAN
        } else {
            indices.len() as f64 / table.len() as f64
        };
        metric(&mut cols[4], "Filtered Data %", pct(share));
    });

    ui.add_space(8.0);
    ui.strong("Quick Statistics");

    let edu_share = |idx: &[usize], level: Education| {
        if idx.is_empty() {
            f64::NAN
        } else {
            let n = idx
                .iter()
                .filter(|&&i| table.records[i].education == level)
                .count();
            n as f64 / idx.len() as f64
        }
    };

    Grid::new("overview_stats").striped(true).show(ui, |ui| {
        ui.strong("Metric");
        ui.strong("Overall");
        ui.strong("Filtered");
        ui.end_row();

        ui.label("Customers");
        ui.label(all.len().to_string());
        ui.label(indices.len().to_string());
        ui.end_row();

        ui.label("Loan Acceptance");
        ui.label(pct(conversion_rate(table, &all)));
        ui.label(pct(conversion_rate(table, indices)));
        ui.end_row();

        ui.label("Avg Income");
        ui.label(money_k(mean_of(table, &all, NumericField::Income), 1));
        ui.label(money_k(mean_of(table, indices, NumericField::Income), 1));
        ui.end_row();

        ui.label("Avg CC Spending");
        ui.label(money_k(mean_of(table, &all, NumericField::CcAvg), 2));
        ui.label(money_k(mean_of(table, indices, NumericField::CcAvg), 2));
        ui.end_row();

        for level in Education::ALL {
            ui.label(format!("{} share", level.label()));
            ui.label(pct(edu_share(&all, level)));
            ui.label(pct(edu_share(indices, level)));
            ui.end_row();
        }
    });
}

// ---------------------------------------------------------------------------
// Section 2: Income Analysis
// ---------------------------------------------------------------------------

fn income_analysis(ui: &mut Ui, state: &AppState) {
    let Some((table, indices)) = state.view() else {
        return;
    };
    let (no_loan, accepted) = split_by_loan(table, indices);

    ui.strong("Income Distribution by Loan Status");
    ui.add_sized([ui.available_width(), 260.0], |ui: &mut Ui| {
        plot::histogram(
            ui,
            "income_hist",
            &[
                plot::Series {
                    name: "No Loan",
                    color: color::NO_LOAN,
                    values: values_of(table, &no_loan, NumericField::Income),
                },
                plot::Series {
                    name: "Accepted Loan",
                    color: color::ACCEPTED_LOAN,
                    values: values_of(table, &accepted, NumericField::Income),
                },
            ],
            50,
            "Income ($k)",
        );
        ui.response()
    });

    ui.add_space(8.0);
    ui.strong("Income Statistics by Loan Status");
    let loan_summary = describe(&values_of(table, &accepted, NumericField::Income));
    let no_loan_summary = describe(&values_of(table, &no_loan, NumericField::Income));

    ui.columns(2, |cols| {
        metric(
            &mut cols[0],
            "Loan Customers – Avg Income",
            money_k(loan_summary.mean, 1),
        );
        metric(
            &mut cols[0],
            "Loan Customers – Median Income",
            money_k(loan_summary.median, 1),
        );
        metric(
            &mut cols[0],
            "Loan Customers – Min Income",
            money_k(loan_summary.min, 1),
        );
        metric(
            &mut cols[1],
            "Non-Loan Customers – Avg Income",
            money_k(no_loan_summary.mean, 1),
        );
        metric(
            &mut cols[1],
            "Non-Loan Customers – Median Income",
            money_k(no_loan_summary.median, 1),
        );
        metric(
            &mut cols[1],
            "Non-Loan Customers – Max Income",
            money_k(no_loan_summary.max, 1),
        );
    });

    ui.add_space(8.0);
    ui.strong("Conversion Rate by Income Bracket");
    let by_bracket = grouped_stats(state.visible_indices.iter().zip(&state.derived).map(
        |(&i, d)| {
            (
                d.bracket,
                table.records[i].accepted_personal_loan as u8 as f64,
            )
        },
    ));
    let bars: Vec<(String, f64, egui::Color32)> = by_bracket
        .iter()
        .map(|(bracket, stats)| {
            let rate = stats.mean();
            (
                bracket.label().to_string(),
                rate * 100.0,
                color::red_yellow_green(rate),
            )
        })
        .collect();
    ui.add_sized([ui.available_width(), 220.0], |ui: &mut Ui| {
        plot::category_bars(ui, "conversion_by_bracket", &bars, "Conversion Rate (%)");
        ui.response()
    });

    ui.add_space(8.0);
    ui.strong("Customers by Income Bracket");
    let counts: Vec<(String, f64, egui::Color32)> = by_bracket
        .iter()
        .map(|(&bracket, stats)| {
            (
                bracket.label().to_string(),
                stats.count as f64,
                color::bracket_color(bracket),
            )
        })
        .collect();
    ui.add_sized([ui.available_width(), 200.0], |ui: &mut Ui| {
        plot::category_bars(ui, "bracket_counts", &counts, "Customers");
        ui.response()
    });
}

// ---------------------------------------------------------------------------
// Section 3: Credit Card Analysis
// ---------------------------------------------------------------------------

fn credit_card_analysis(ui: &mut Ui, state: &AppState) {
    let Some((table, indices)) = state.view() else {
        return;
    };
    let (no_loan, accepted) = split_by_loan(table, indices);

    ui.strong("CC Spending Distribution");
    ui.add_sized([ui.available_width(), 240.0], |ui: &mut Ui| {
        plot::histogram(
            ui,
            "cc_hist",
            &[
                plot::Series {
                    name: "No Loan",
                    color: color::NO_LOAN,
                    values: values_of(table, &no_loan, NumericField::CcAvg),
                },
                plot::Series {
                    name: "Accepted Loan",
                    color: color::ACCEPTED_LOAN,
                    values: values_of(table, &accepted, NumericField::CcAvg),
                },
            ],
            50,
            "Monthly CC Spending ($k)",
        );
        ui.response()
    });

    ui.add_space(8.0);
    ui.strong("Income vs CC Spending");
    let cloud = |idx: &[usize]| -> Vec<[f64; 2]> {
        idx.iter()
            .map(|&i| {
                let rec = &table.records[i];
                [rec.income, rec.cc_avg_spend]
            })
            .collect()
    };
    ui.add_sized([ui.available_width(), 260.0], |ui: &mut Ui| {
        plot::scatter(
            ui,
            "income_vs_cc",
            &[
                ("No Loan".to_string(), color::NO_LOAN, cloud(&no_loan)),
                (
                    "Accepted Loan".to_string(),
                    color::ACCEPTED_LOAN,
                    cloud(&accepted),
                ),
            ],
            "Income ($k)",
            "Monthly CC Spending ($k)",
        );
        ui.response()
    });

    ui.add_space(8.0);
    ui.strong("High Spender Detection (IQR fence)");
    let segments = vip_segments(table, indices);
    let outliers = &segments.high_spenders;
    let normal: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|i| !outliers.contains(i))
        .collect();
    let share = if indices.is_empty() {
        f64::NAN
    } else {
        outliers.len() as f64 / indices.len() as f64
    };

    ui.columns(3, |cols| {
        metric(
            &mut cols[0],
            "Outlier Customers",
            format!("{} ({})", outliers.len(), pct(share)),
        );
        metric(
            &mut cols[1],
            "Outlier Conversion",
            format!(
                "{} vs {}",
                pct(conversion_rate(table, outliers)),
                pct(conversion_rate(table, &normal))
            ),
        );
        metric(
            &mut cols[2],
            "Outlier Threshold",
            money_k(segments.spend_threshold, 2),
        );
    });
}

// ---------------------------------------------------------------------------
// Section 4: Education Analysis
// ---------------------------------------------------------------------------

fn education_analysis(ui: &mut Ui, state: &AppState) {
    let Some((table, indices)) = state.view() else {
        return;
    };

    ui.strong("Loan Acceptance by Education");
    let by_education = grouped_stats(indices.iter().map(|&i| {
        let rec = &table.records[i];
        (
            rec.education,
            rec.accepted_personal_loan as u8 as f64,
        )
    }));
    let bars: Vec<(String, f64, egui::Color32)> = by_education
        .iter()
        .map(|(&level, stats)| {
            (
                level.label().to_string(),
                stats.mean() * 100.0,
                color::education_color(level),
            )
        })
        .collect();
    ui.add_sized([ui.available_width(), 220.0], |ui: &mut Ui| {
        plot::category_bars(ui, "conversion_by_education", &bars, "Conversion Rate (%)");
        ui.response()
    });

    ui.add_space(8.0);
    ui.strong("Detailed Education Statistics");
    Grid::new("education_stats").striped(true).show(ui, |ui| {
        for header in [
            "Education", "Count", "Loans", "Loan Rate", "Avg Income", "Median Income",
            "Min Income", "Max Income", "Avg CC",
        ] {
            ui.strong(header);
        }
        ui.end_row();

        for level in Education::ALL {
            let subset: Vec<usize> = indices
                .iter()
                .copied()
                .filter(|&i| table.records[i].education == level)
                .collect();
            if subset.is_empty() {
                continue;
            }
            let income = describe(&values_of(table, &subset, NumericField::Income));
            let loans = subset
                .iter()
                .filter(|&&i| table.records[i].accepted_personal_loan)
                .count();

            ui.label(level.label());
            ui.label(subset.len().to_string());
            ui.label(loans.to_string());
            ui.label(pct(conversion_rate(table, &subset)));
            ui.label(money_k(income.mean, 1));
            ui.label(money_k(income.median, 1));
            ui.label(money_k(income.min, 1));
            ui.label(money_k(income.max, 1));
            ui.label(money_k(mean_of(table, &subset, NumericField::CcAvg), 2));
            ui.end_row();
        }
    });
}

// ---------------------------------------------------------------------------
// Section 5: VIP Segment
// ---------------------------------------------------------------------------

fn vip_segment(ui: &mut Ui, state: &AppState) {
    let Some((table, indices)) = state.view() else {
        return;
    };
    let segments = vip_segments(table, indices);
    let share = |n: usize| {
        if indices.is_empty() {
            f64::NAN
        } else {
            n as f64 / indices.len() as f64
        }
    };

    ui.columns(3, |cols| {
        metric(
            &mut cols[0],
            "Tier 1 (VIP)",
            format!("{} ({})", segments.tier1.len(), pct(share(segments.tier1.len()))),
        );
        metric(
            &mut cols[0],
            "T1 Conversion",
            pct(conversion_rate(table, &segments.tier1)),
        );
        metric(
            &mut cols[1],
            "Tier 2 (Core)",
            format!("{} ({})", segments.tier2.len(), pct(share(segments.tier2.len()))),
        );
        metric(
            &mut cols[1],
            "T2 Conversion",
            pct(conversion_rate(table, &segments.tier2)),
        );
        metric(
            &mut cols[2],
            "High Spenders",
            format!(
                "{} ({})",
                segments.high_spenders.len(),
                pct(share(segments.high_spenders.len()))
            ),
        );
        metric(
            &mut cols[2],
            "HS Conversion",
            pct(conversion_rate(table, &segments.high_spenders)),
        );
    });

    ui.add_space(8.0);
    ui.separator();

    // The three segments overlap; they are profiles, not a partition.
    ui.columns(3, |cols| {
        cols[0].strong("Tier 1: Premium VIP");
        cols[0].label("Income $150k+, CC spend $4k+/mo, Graduate/Professional.");
        cols[0].label("Action: dedicated account managers.");

        cols[1].strong("Tier 2: Core Targets");
        cols[1].label("Income $100-150k, CC spend $2-4k/mo, Graduate/Professional.");
        cols[1].label("Action: email and phone campaigns.");

        cols[2].strong("High Spenders");
        cols[2].label(format!(
            "CC spend above {} /mo (IQR fence on the current view).",
            money_k(segments.spend_threshold, 1)
        ));
        cols[2].label(format!(
            "Avg income {}.",
            money_k(mean_of(table, &segments.high_spenders, NumericField::Income), 0)
        ));
        cols[2].label("Action: premium products.");
    });

    ui.add_space(8.0);
    ui.strong("Segment Size Comparison");
    let bars = vec![
        (
            "Tier 1 (VIP)".to_string(),
            segments.tier1.len() as f64,
            color::tier_color(Tier::Vip),
        ),
        (
            "Tier 2 (Core)".to_string(),
            segments.tier2.len() as f64,
            color::tier_color(Tier::Core),
        ),
        (
            "High Spenders".to_string(),
            segments.high_spenders.len() as f64,
            color::tier_color(Tier::DoNotPursue),
        ),
    ];
    ui.add_sized([ui.available_width(), 200.0], |ui: &mut Ui| {
        plot::category_bars(ui, "vip_sizes", &bars, "Customers");
        ui.response()
    });
}

// ---------------------------------------------------------------------------
// Section 6: Customer Tiers
// ---------------------------------------------------------------------------

fn customer_tiers(ui: &mut Ui, state: &AppState) {
    let Some((table, indices)) = state.view() else {
        return;
    };

    let by_tier = grouped_stats(indices.iter().zip(&state.derived).map(|(&i, d)| {
        (
            d.tier,
            table.records[i].accepted_personal_loan as u8 as f64,
        )
    }));

    ui.columns(4, |cols| {
        for (col, tier) in cols.iter_mut().zip(Tier::ALL) {
            let stats = by_tier.get(&tier).copied().unwrap_or_default();
            let share = if indices.is_empty() {
                f64::NAN
            } else {
                stats.count as f64 / indices.len() as f64
            };
            col.label(
                RichText::new(tier.label())
                    .strong()
                    .color(color::tier_color(tier)),
            );
            col.label(format!("{} ({})", stats.count, pct(share)));
            col.label(format!("Conv: {}", pct(stats.mean())));
        }
    });

    ui.add_space(8.0);
    ui.strong("Conversion Rate by Tier");
    let bars: Vec<(String, f64, egui::Color32)> = Tier::ALL
        .iter()
        .filter_map(|&tier| {
            by_tier.get(&tier).map(|stats| {
                (
                    tier.label().to_string(),
                    stats.mean() * 100.0,
                    color::tier_color(tier),
                )
            })
        })
        .collect();
    ui.add_sized([ui.available_width(), 220.0], |ui: &mut Ui| {
        plot::category_bars(ui, "conversion_by_tier", &bars, "Conversion Rate (%)");
        ui.response()
    });

    ui.add_space(8.0);
    ui.strong("Tier Details");
    Grid::new("tier_details").striped(true).show(ui, |ui| {
        for header in ["Tier", "Size", "Share", "Conversion", "Avg Income", "Avg CC", "Action"] {
            ui.strong(header);
        }
        ui.end_row();

        for tier in Tier::ALL {
            let subset: Vec<usize> = indices
                .iter()
                .zip(&state.derived)
                .filter(|(_, d)| d.tier == tier)
                .map(|(&i, _)| i)
                .collect();
            if subset.is_empty() {
                continue;
            }
            let share = subset.len() as f64 / indices.len() as f64;
            ui.label(RichText::new(tier.label()).color(color::tier_color(tier)));
            ui.label(subset.len().to_string());
            ui.label(pct(share));
            ui.label(pct(conversion_rate(table, &subset)));
            ui.label(money_k(mean_of(table, &subset, NumericField::Income), 0));
            ui.label(money_k(mean_of(table, &subset, NumericField::CcAvg), 2));
            ui.label(match tier {
                Tier::Vip => "Dedicated managers, fast-track approval",
                Tier::Core => "Email campaigns, phone outreach",
                Tier::Secondary => "Digital marketing, lower budget",
                Tier::DoNotPursue => "No outreach",
            });
            ui.end_row();
        }
    });
}

// ---------------------------------------------------------------------------
// Section 7: Data Explorer
// ---------------------------------------------------------------------------

const PREVIEW_ROWS: usize = 100;

fn data_explorer(ui: &mut Ui, state: &mut AppState) {
    if ui.button("Download filtered data as CSV").clicked() {
        panels::export_dialog(state);
    }
    let Some((table, indices)) = state.view() else {
        return;
    };

    ui.add_space(6.0);
    ui.strong(format!(
        "Filtered Dataset (first {} of {} rows)",
        indices.len().min(PREVIEW_ROWS),
        indices.len()
    ));
    ScrollArea::horizontal().id_salt("preview_scroll").show(ui, |ui: &mut Ui| {
        Grid::new("data_preview").striped(true).show(ui, |ui| {
            for header in ["ID", "Age", "Income", "CCAvg", "Education", "Mortgage", "Personal Loan", "Tier"] {
                ui.strong(header);
            }
            ui.end_row();

            for (&i, derived) in indices.iter().zip(&state.derived).take(PREVIEW_ROWS) {
                let rec = &table.records[i];
                ui.label(rec.id.to_string());
                ui.label(rec.age.to_string());
                ui.label(format!("{:.1}", rec.income));
                ui.label(format!("{:.2}", rec.cc_avg_spend));
                ui.label(derived.education_label);
                ui.label(format!("{:.0}", rec.mortgage));
                ui.label(if rec.accepted_personal_loan { "1" } else { "0" });
                ui.label(
                    RichText::new(derived.tier.label()).color(color::tier_color(derived.tier)),
                );
                ui.end_row();
            }
        });
    });

    ui.add_space(8.0);
    ui.strong("Summary Statistics");
    summary_grid(ui, "describe_all", table, indices);

    ui.add_space(8.0);
    ui.strong("Statistics by Loan Status");
    let (no_loan, accepted) = split_by_loan(table, indices);
    ui.label("No Loan");
    summary_grid(ui, "describe_no_loan", table, &no_loan);
    ui.label("Accepted Loan");
    summary_grid(ui, "describe_loan", table, &accepted);

    ui.add_space(8.0);
    ui.strong("Correlation Matrix (Pearson)");
    let matrix = correlation_matrix(table, indices, &NumericField::CORRELATION);
    plot::correlation_grid(ui, &matrix);

    ui.add_space(8.0);
    ui.strong("Correlation with Personal Loan");
    let bars: Vec<(String, f64, egui::Color32)> = matrix
        .ranked_against(NumericField::PersonalLoan)
        .into_iter()
        .map(|(field, r)| (field.name().to_string(), r, color::diverging(r)))
        .collect();
    ui.add_sized([ui.available_width(), 220.0], |ui: &mut Ui| {
        plot::category_bars(ui, "loan_correlations", &bars, "Correlation");
        ui.response()
    });
}

fn summary_grid(ui: &mut Ui, id: &str, table: &CustomerTable, indices: &[usize]) {
    Grid::new(id).striped(true).show(ui, |ui| {
        for header in ["Field", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"] {
            ui.strong(header);
        }
        ui.end_row();

        for field in NumericField::DESCRIBE {
            let summary = describe(&values_of(table, indices, field));
            ui.label(field.name());
            ui.label(summary.count.to_string());
            ui.label(num(summary.mean));
            ui.label(num(summary.std));
            ui.label(num(summary.min));
            ui.label(num(summary.q1));
            ui.label(num(summary.median));
            ui.label(num(summary.q3));
            ui.label(num(summary.max));
            ui.end_row();
        }
    });
}
