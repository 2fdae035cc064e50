//! Plan reports for the presentation layer
//!
//! A [`PlanReport`] is a read-only snapshot of a profile's inputs, the
//! recompute result and the weight projection. It renders to text tables or
//! serializes to JSON.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::models::{ActivityLevel, Gender, NutritionResult, ProjectionPoint, UserProfile};
use crate::nutrition::{NutritionEngine, KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};

pub mod json;
pub mod text;

/// Longest projection a report carries, in weeks
pub const MAX_REPORT_WEEKS: u32 = 520;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Text,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Border style used for text tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStyle {
    #[default]
    Rounded,
    Ascii,
    Markdown,
    Blank,
}

impl std::str::FromStr for TableStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rounded" => Ok(TableStyle::Rounded),
            "ascii" => Ok(TableStyle::Ascii),
            "markdown" | "md" => Ok(TableStyle::Markdown),
            "blank" | "plain" => Ok(TableStyle::Blank),
            _ => Err(format!("Invalid table style: {}", s)),
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Profile inputs as shown in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSummary {
    pub gender: Gender,
    pub age: Option<u32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub activity_factor: f64,
    pub target_weight: Option<f64>,
    pub timeframe: u32,
}

impl From<&UserProfile> for InputSummary {
    fn from(profile: &UserProfile) -> Self {
        InputSummary {
            gender: profile.gender,
            age: profile.age,
            height: profile.height,
            weight: profile.weight,
            activity_level: profile.activity_level,
            activity_factor: profile.activity_factor(),
            target_weight: profile.target_weight,
            timeframe: profile.timeframe,
        }
    }
}

/// Calories contributed by each macronutrient and their share of the total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroSplit {
    pub protein_kcal: i64,
    pub fat_kcal: i64,
    pub carbs_kcal: i64,
    pub total_kcal: i64,
    /// Percentages of `total_kcal`, one decimal
    pub protein_percent: Decimal,
    pub fat_percent: Decimal,
    pub carbs_percent: Decimal,
}

impl MacroSplit {
    pub fn from_result(result: &NutritionResult) -> Self {
        let protein_kcal = result.protein * KCAL_PER_G_PROTEIN as i64;
        let fat_kcal = result.fat * KCAL_PER_G_FAT as i64;
        let carbs_kcal = result.carbs * KCAL_PER_G_CARBS as i64;
        let total_kcal = protein_kcal + fat_kcal + carbs_kcal;

        let percent = |kcal: i64| {
            if total_kcal <= 0 {
                return Decimal::ZERO;
            }
            (Decimal::from(kcal) * Decimal::ONE_HUNDRED / Decimal::from(total_kcal)).round_dp(1)
        };

        MacroSplit {
            protein_kcal,
            fat_kcal,
            carbs_kcal,
            total_kcal,
            protein_percent: percent(protein_kcal),
            fat_percent: percent(fat_kcal),
            carbs_percent: percent(carbs_kcal),
        }
    }
}

/// Snapshot of a plan for display or export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub generated_at: DateTime<Utc>,
    pub inputs: InputSummary,
    pub nutrition: NutritionResult,
    pub surplus_kcal: i64,
    pub macro_split: MacroSplit,
    pub time_to_goal_weeks: u32,
    pub projection: Vec<ProjectionPoint>,
    pub notes: Vec<String>,
}

impl PlanReport {
    /// Build a report around an already computed result
    pub fn new(profile: &UserProfile, nutrition: NutritionResult) -> Self {
        let full_projection = NutritionEngine::generate_weight_projection(profile);
        let projection: Vec<ProjectionPoint> = full_projection
            .iter()
            .take(MAX_REPORT_WEEKS as usize + 1)
            .collect();
        let time_to_goal_weeks = NutritionEngine::calculate_time_to_goal(profile);

        let mut notes = Vec::new();
        if full_projection.len() > projection.len() {
            notes.push(format!(
                "Projection cut off after {} of {} weeks",
                MAX_REPORT_WEEKS,
                full_projection.weeks()
            ));
        }
        if nutrition.bmr == 0 {
            notes.push("Age, height and weight are needed for a BMR estimate".to_string());
        }
        if !profile.has_gain_goal() {
            notes.push(format!(
                "No target weight above the current weight; using the default {} kg/week",
                nutrition.weekly_gain_goal
            ));
        } else if time_to_goal_weeks > profile.timeframe && profile.timeframe > 0 {
            notes.push(format!(
                "Reaching the target takes about {} weeks at a safe rate, longer than the {} week timeframe",
                time_to_goal_weeks, profile.timeframe
            ));
        }

        PlanReport {
            generated_at: Utc::now(),
            inputs: InputSummary::from(profile),
            surplus_kcal: nutrition.daily_calories - nutrition.tdee,
            macro_split: MacroSplit::from_result(&nutrition),
            nutrition,
            time_to_goal_weeks,
            projection,
            notes,
        }
    }

    /// Build a report from a fresh evaluation of the profile
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self::new(profile, NutritionEngine::evaluate(profile))
    }

    /// Projected weight at the end of the projection, if any
    pub fn final_weight(&self) -> Option<f64> {
        self.projection.last().map(|p| p.weight)
    }

    /// Macro share as a plain float, for progress bars and charts
    pub fn protein_share(&self) -> f64 {
        self.macro_split.protein_percent.to_f64().unwrap_or(0.0) / 100.0
    }
}

/// Write a report to `output_path` in the given format
pub fn export_report<P: AsRef<Path>>(
    report: &PlanReport,
    format: ExportFormat,
    style: TableStyle,
    output_path: P,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Json => json::export_plan_report(report, output_path),
        ExportFormat::Text => text::export_plan_report(report, style, output_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn gain_profile() -> UserProfile {
        UserProfile {
            age: Some(25),
            height: Some(175.0),
            weight: Some(60.0),
            target_weight: Some(65.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_macro_split() {
        let result = NutritionResult {
            bmr: 1590,
            tdee: 2465,
            daily_calories: 2905,
            weekly_gain_goal: 0.5,
            protein: 119,
            carbs: 474,
            fat: 84,
        };
        let split = MacroSplit::from_result(&result);

        assert_eq!(split.protein_kcal, 476);
        assert_eq!(split.fat_kcal, 756);
        assert_eq!(split.carbs_kcal, 1896);
        assert_eq!(split.total_kcal, 3128);
        assert_eq!(split.protein_percent, dec!(15.2));
        assert_eq!(split.fat_percent, dec!(24.2));
        assert_eq!(split.carbs_percent, dec!(60.6));
    }

    #[test]
    fn test_macro_split_empty() {
        let result = NutritionResult {
            bmr: 0,
            tdee: 0,
            daily_calories: 400,
            weekly_gain_goal: 0.4,
            protein: 0,
            carbs: 0,
            fat: 0,
        };
        let split = MacroSplit::from_result(&result);
        assert_eq!(split.total_kcal, 0);
        assert_eq!(split.protein_percent, Decimal::ZERO);
    }

    #[test]
    fn test_report_from_profile() {
        let report = PlanReport::from_profile(&gain_profile());

        assert_eq!(report.nutrition.daily_calories, 2905);
        assert_eq!(report.surplus_kcal, 440);
        assert_eq!(report.time_to_goal_weeks, 10);
        assert_eq!(report.projection.len(), 9);
        assert_eq!(report.final_weight(), Some(64.0));
        assert_eq!(report.notes.len(), 1);
        assert!(report.notes[0].contains("10 weeks"));
        assert!(report.protein_share() > 0.15 && report.protein_share() < 0.16);
    }

    #[test]
    fn test_report_caps_projection() {
        let mut profile = gain_profile();
        profile.timeframe = u32::MAX;
        let report = PlanReport::from_profile(&profile);

        assert_eq!(report.projection.len(), MAX_REPORT_WEEKS as usize + 1);
        assert_eq!(report.projection.last().map(|p| p.week), Some(MAX_REPORT_WEEKS));
        assert!(report.notes[0].starts_with("Projection cut off after 520"));
    }

    #[test]
    fn test_report_without_goal() {
        let mut profile = gain_profile();
        profile.target_weight = None;
        let report = PlanReport::from_profile(&profile);

        assert!(report.projection.is_empty());
        assert_eq!(report.time_to_goal_weeks, 0);
        assert!(report.notes[0].contains("0.4 kg/week"));
    }
}
