use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::models::UserProfile;

pub const AGE_RANGE: RangeInclusive<u32> = 10..=100;
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 100.0..=250.0;
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 30.0..=300.0;
pub const TIMEFRAME_RANGE_WEEKS: RangeInclusive<u32> = 1..=52;

/// How serious a validation finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueSeverity {
    /// Input must be fixed before it is accepted
    Error,
    /// Input is accepted; the engine will fall back to a default
    Warning,
}

/// A single finding about a profile field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
    pub severity: IssueSeverity,
}

impl ValidationIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        ValidationIssue {
            field,
            message: message.into(),
            severity: IssueSeverity::Error,
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        ValidationIssue {
            field,
            message: message.into(),
            severity: IssueSeverity::Warning,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Input checks run before a profile reaches the engine
pub struct ProfileValidator;

impl ProfileValidator {
    /// Check every input field of a profile
    pub fn validate(profile: &UserProfile) -> Vec<ValidationIssue> {
        let mut issues = Self::validate_basic_info(profile);
        issues.extend(Self::validate_goal_settings(profile));
        issues
    }

    /// Biometric inputs: age, height, weight, activity level
    pub fn validate_basic_info(profile: &UserProfile) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        match profile.age {
            None => issues.push(ValidationIssue::warning("age", "not set, BMR will be 0")),
            Some(age) if !AGE_RANGE.contains(&age) => issues.push(ValidationIssue::error(
                "age",
                format!(
                    "must be between {} and {} years, got {}",
                    AGE_RANGE.start(),
                    AGE_RANGE.end(),
                    age
                ),
            )),
            Some(_) => {}
        }

        match profile.height {
            None => issues.push(ValidationIssue::warning("height", "not set, BMR will be 0")),
            Some(height) if !HEIGHT_RANGE_CM.contains(&height) => {
                issues.push(ValidationIssue::error(
                    "height",
                    format!(
                        "must be between {} and {} cm, got {}",
                        HEIGHT_RANGE_CM.start(),
                        HEIGHT_RANGE_CM.end(),
                        height
                    ),
                ))
            }
            Some(_) => {}
        }

        match profile.weight {
            None => issues.push(ValidationIssue::warning("weight", "not set, BMR will be 0")),
            Some(weight) if !WEIGHT_RANGE_KG.contains(&weight) => {
                issues.push(Self::weight_out_of_range("weight", weight))
            }
            Some(_) => {}
        }

        if profile.activity_level.is_none() {
            issues.push(ValidationIssue::warning(
                "activityLevel",
                "unknown, the moderate factor 1.55 will be used",
            ));
        }

        issues
    }

    /// Goal inputs: target weight and timeframe
    pub fn validate_goal_settings(profile: &UserProfile) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if let Some(target) = profile.target_weight {
            if !WEIGHT_RANGE_KG.contains(&target) {
                issues.push(Self::weight_out_of_range("targetWeight", target));
            } else if let Some(weight) = profile.weight {
                if target <= weight {
                    issues.push(ValidationIssue::warning(
                        "targetWeight",
                        format!(
                            "{} kg is not above the current {} kg, default gain rate will be used",
                            target, weight
                        ),
                    ));
                }
            }
        }

        if !TIMEFRAME_RANGE_WEEKS.contains(&profile.timeframe) {
            issues.push(ValidationIssue::error(
                "timeframe",
                format!(
                    "must be between {} and {} weeks, got {}",
                    TIMEFRAME_RANGE_WEEKS.start(),
                    TIMEFRAME_RANGE_WEEKS.end(),
                    profile.timeframe
                ),
            ));
        }

        issues
    }

    pub fn has_errors(issues: &[ValidationIssue]) -> bool {
        issues.iter().any(|i| i.severity == IssueSeverity::Error)
    }

    fn weight_out_of_range(field: &'static str, value: f64) -> ValidationIssue {
        ValidationIssue::error(
            field,
            format!(
                "must be between {} and {} kg, got {}",
                WEIGHT_RANGE_KG.start(),
                WEIGHT_RANGE_KG.end(),
                value
            ),
        )
    }
}
