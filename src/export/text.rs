use super::{ExportError, PlanReport, TableStyle};
use std::fmt;
use std::io::Write;
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct MacroRow {
    #[tabled(rename = "Macro")]
    name: &'static str,
    #[tabled(rename = "Grams")]
    grams: i64,
    #[tabled(rename = "kcal")]
    kcal: i64,
    #[tabled(rename = "Share")]
    share: String,
}

#[derive(Tabled)]
struct ProjectionRow {
    #[tabled(rename = "Week")]
    week: u32,
    #[tabled(rename = "Weight (kg)")]
    weight: String,
}

fn render_table<T: Tabled>(rows: Vec<T>, style: TableStyle) -> String {
    let mut table = Table::new(rows);
    match style {
        TableStyle::Rounded => table.with(Style::rounded()),
        TableStyle::Ascii => table.with(Style::ascii()),
        TableStyle::Markdown => table.with(Style::markdown()),
        TableStyle::Blank => table.with(Style::blank()),
    };
    table.to_string()
}

fn optional<T: std::fmt::Display>(value: Option<T>, unit: &str) -> String {
    match value {
        Some(v) => format!("{} {}", v, unit).trim_end().to_string(),
        None => "not set".to_string(),
    }
}

/// Render the inputs table
pub fn render_inputs(report: &PlanReport, style: TableStyle) -> String {
    let inputs = &report.inputs;
    let activity = match inputs.activity_level {
        Some(level) => format!("{} (x{})", level, inputs.activity_factor),
        None => format!("unknown (x{})", inputs.activity_factor),
    };

    let rows = vec![
        MetricRow { metric: "Gender", value: inputs.gender.to_string() },
        MetricRow { metric: "Age", value: optional(inputs.age, "years") },
        MetricRow { metric: "Height", value: optional(inputs.height, "cm") },
        MetricRow { metric: "Weight", value: optional(inputs.weight, "kg") },
        MetricRow { metric: "Activity", value: activity },
        MetricRow { metric: "Target weight", value: optional(inputs.target_weight, "kg") },
        MetricRow { metric: "Timeframe", value: format!("{} weeks", inputs.timeframe) },
    ];

    render_table(rows, style)
}

/// Render energy and macro targets
pub fn render_nutrition(report: &PlanReport, style: TableStyle) -> String {
    let n = &report.nutrition;
    let energy = vec![
        MetricRow { metric: "BMR", value: format!("{} kcal", n.bmr) },
        MetricRow { metric: "TDEE", value: format!("{} kcal", n.tdee) },
        MetricRow { metric: "Surplus", value: format!("{} kcal", report.surplus_kcal) },
        MetricRow { metric: "Daily calories", value: format!("{} kcal", n.daily_calories) },
        MetricRow { metric: "Weekly gain", value: format!("{} kg", n.weekly_gain_goal) },
    ];

    let split = &report.macro_split;
    let macros = vec![
        MacroRow {
            name: "Protein",
            grams: n.protein,
            kcal: split.protein_kcal,
            share: format!("{}%", split.protein_percent),
        },
        MacroRow {
            name: "Carbs",
            grams: n.carbs,
            kcal: split.carbs_kcal,
            share: format!("{}%", split.carbs_percent),
        },
        MacroRow {
            name: "Fat",
            grams: n.fat,
            kcal: split.fat_kcal,
            share: format!("{}%", split.fat_percent),
        },
    ];

    format!("{}\n{}", render_table(energy, style), render_table(macros, style))
}

/// Render the weekly projection, empty string when there is none
pub fn render_projection(report: &PlanReport, style: TableStyle) -> String {
    if report.projection.is_empty() {
        return String::new();
    }

    let rows = report
        .projection
        .iter()
        .map(|p| ProjectionRow {
            week: p.week,
            weight: format!("{:.1}", p.weight),
        })
        .collect();

    render_table::<ProjectionRow>(rows, style)
}

/// Write the whole report as plain text
pub fn write_plan_report<W: fmt::Write>(
    out: &mut W,
    report: &PlanReport,
    style: TableStyle,
) -> fmt::Result {
    writeln!(out, "WEIGHT GAIN PLAN")?;
    writeln!(
        out,
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out)?;

    writeln!(out, "PROFILE")?;
    writeln!(out, "{}", render_inputs(report, style))?;
    writeln!(out)?;

    writeln!(out, "DAILY TARGETS")?;
    writeln!(out, "{}", render_nutrition(report, style))?;
    writeln!(out)?;

    if report.time_to_goal_weeks > 0 {
        writeln!(
            out,
            "Estimated time to goal: {} weeks",
            report.time_to_goal_weeks
        )?;
    }

    let projection = render_projection(report, style);
    if !projection.is_empty() {
        writeln!(out, "PROJECTION")?;
        writeln!(out, "{}", projection)?;
        writeln!(out)?;
    }

    if !report.notes.is_empty() {
        writeln!(out, "NOTES")?;
        for note in &report.notes {
            writeln!(out, "• {}", note)?;
        }
    }

    Ok(())
}

/// Render the whole report into a string
pub fn render_plan_report(report: &PlanReport, style: TableStyle) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_plan_report(&mut out, report, style)?;
    Ok(out)
}

/// Export a plan report to human-readable text format
pub fn export_plan_report<P: AsRef<Path>>(
    report: &PlanReport,
    style: TableStyle,
    output_path: P,
) -> Result<(), ExportError> {
    let text = render_plan_report(report, style)
        .map_err(|e| ExportError::SerializationError(e.to_string()))?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}
