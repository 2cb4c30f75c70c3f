use std::path::Path;

use anyhow::Context as _;
use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::export::export_csv;
use crate::data::filter::FilterCriteria;
use crate::data::loader;
use crate::data::model::{Education, NumericField};
use crate::data::stats::conversion_rate;
use crate::state::{AppState, Section};

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: section picker, the four filter controls, and
/// the live view metrics.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.separator();
    for section in Section::ALL {
        ui.selectable_value(&mut state.section, section, section.title());
    }

    ui.add_space(8.0);
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    // Slider bounds come from the full table, not the filtered view, so
    // narrowing a filter never shrinks its own control.
    let income_bounds = dataset
        .field_range(NumericField::Income)
        .unwrap_or((0.0, 250.0));
    let cc_bounds = dataset
        .field_range(NumericField::CcAvg)
        .unwrap_or((0.0, 10.0));

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Income Range ($k)");
            let (mut lo, mut hi) = state.criteria.income;
            changed |= ui
                .add(Slider::new(&mut lo, income_bounds.0..=income_bounds.1).text("from"))
                .changed();
            changed |= ui
                .add(Slider::new(&mut hi, income_bounds.0..=income_bounds.1).text("to"))
                .changed();
            state.criteria.income = (lo, hi);

            ui.add_space(6.0);
            ui.strong("CC Spending ($k/month)");
            let (mut lo, mut hi) = state.criteria.cc_avg;
            changed |= ui
                .add(
                    Slider::new(&mut lo, cc_bounds.0..=cc_bounds.1)
                        .step_by(0.1)
                        .text("from"),
                )
                .changed();
            changed |= ui
                .add(
                    Slider::new(&mut hi, cc_bounds.0..=cc_bounds.1)
                        .step_by(0.1)
                        .text("to"),
                )
                .changed();
            state.criteria.cc_avg = (lo, hi);

            ui.add_space(6.0);
            ui.strong("Education Level");
            for level in Education::ALL {
                let mut selected = state.criteria.education.contains(&level);
                if ui.checkbox(&mut selected, level.label()).changed() {
                    if selected {
                        state.criteria.education.insert(level);
                    } else {
                        state.criteria.education.remove(&level);
                    }
                    changed = true;
                }
            }

            ui.add_space(6.0);
            ui.strong("Personal Loan Status");
            for (status, label) in [(false, "No Loan"), (true, "Accepted Loan")] {
                let mut selected = state.criteria.loan_status.contains(&status);
                if ui.checkbox(&mut selected, label).changed() {
                    if selected {
                        state.criteria.loan_status.insert(status);
                    } else {
                        state.criteria.loan_status.remove(&status);
                    }
                    changed = true;
                }
            }

            ui.add_space(8.0);
            if ui.button("Reset filters").clicked() {
                let mut criteria = FilterCriteria::default();
                criteria.income = income_bounds;
                criteria.cc_avg = cc_bounds;
                state.criteria = criteria;
                changed = true;
            }

            ui.separator();
            let visible = state.visible_indices.len();
            let total = dataset.len();
            ui.label(format!("Filtered records: {visible} / {total}"));
            let rate = conversion_rate(&dataset, &state.visible_indices);
            let rate_text = if rate.is_nan() {
                "Conversion rate: --".to_string()
            } else {
                format!("Conversion rate: {:.1}%", rate * 100.0)
            };
            ui.label(rate_text);
        });

    if changed {
        state.refilter();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export filtered CSV…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload dataset").clicked() {
                reload(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} customers loaded, {} in view",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

/// Load a dataset through the process-wide cache and install it in the
/// app state.
pub fn load_dataset(state: &mut AppState, path: &Path) {
    state.loading = true;
    match loader::load_cached(path) {
        Ok(table) => {
            log::info!("Loaded {} customers from {}", table.len(), path.display());
            state.set_dataset(table);
        }
        Err(e) => {
            log::error!("Failed to load {}: {e}", path.display());
            state.status_message = Some(format!("Error: {e}"));
            state.loading = false;
        }
    }
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open customer data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_dataset(state, &path);
    }
}

/// Re-read the current source file, bypassing the cache (the one explicit
/// invalidation point).
fn reload(state: &mut AppState) {
    let Some(source) = state.dataset.as_ref().map(|d| d.source.clone()) else {
        return;
    };
    loader::invalidate_cache();
    load_dataset(state, &source);
}

/// Write the current filtered view to a CSV file chosen by the user.
pub fn export_dialog(state: &mut AppState) {
    let Some(table) = state.dataset.clone() else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export filtered customers")
        .set_file_name("filtered_customers.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    let Some(path) = file else { return };

    let result = export_csv(&table, &state.visible_indices)
        .context("serializing filtered view")
        .and_then(|bytes| {
            std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))
        });

    match result {
        Ok(()) => {
            log::info!(
                "Exported {} rows to {}",
                state.visible_indices.len(),
                path.display()
            );
            state.status_message = None;
        }
        Err(e) => {
            log::error!("CSV export failed: {e:#}");
            state.status_message = Some(format!("Export failed: {e:#}"));
        }
    }
}
