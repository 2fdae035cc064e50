//! Nutrition calculation engine
//!
//! Derives energy needs and a macronutrient split for a weight-gain goal from a
//! single [`UserProfile`]. Every quantity is a pure function of the profile:
//!
//! BMR → TDEE → daily calories → weekly gain rate → protein → fat → carbs
//!
//! Nothing here fails. Missing inputs degrade to sentinels (0, an empty
//! projection, the 1.55 activity factor or the 0.4 kg/week fallback rate) and
//! callers are expected to validate input beforehand.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{Gender, NutritionResult, UserProfile};
use crate::projection::WeightProjection;

/// Surplus used when no gain goal is set (kcal/day)
pub const BASE_SURPLUS_KCAL: f64 = 400.0;
/// Upper bound on the goal-scaled surplus (kcal/day)
pub const MAX_SURPLUS_KCAL: f64 = 600.0;
/// Weekly gain rate used when no valid gain goal exists (kg/week)
pub const FALLBACK_WEEKLY_GAIN: f64 = 0.4;
/// Lower bound of the weekly gain rate (kg/week)
pub const MIN_WEEKLY_GAIN: f64 = 0.25;

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

const HIGH_ACTIVITY_FACTOR: f64 = 1.725;
const LOW_ACTIVITY_FACTOR: f64 = 1.375;
const BASE_PROTEIN_G_PER_KG: f64 = 1.9;

/// Goal timeframe bucket shared by the protein, fat and carb rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeframeTier {
    /// 6 weeks or less
    Short,
    /// 7 to 12 weeks
    Medium,
    /// More than 12 weeks
    Long,
}

impl TimeframeTier {
    pub fn from_weeks(weeks: u32) -> Self {
        if weeks <= 6 {
            TimeframeTier::Short
        } else if weeks <= 12 {
            TimeframeTier::Medium
        } else {
            TimeframeTier::Long
        }
    }
}

/// Coarse activity bucket used by the ±10% / ±0.1 adjustments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivityBand {
    High,
    Mid,
    Low,
}

impl ActivityBand {
    fn of(profile: &UserProfile) -> Self {
        let factor = profile.activity_factor();
        if factor >= HIGH_ACTIVITY_FACTOR {
            ActivityBand::High
        } else if factor <= LOW_ACTIVITY_FACTOR {
            ActivityBand::Low
        } else {
            ActivityBand::Mid
        }
    }
}

/// Stateless calculator over a borrowed profile
pub struct NutritionEngine;

impl NutritionEngine {
    /// Basal metabolic rate, revised Harris-Benedict equation (kcal/day)
    ///
    /// - male: 88.362 + 13.397 × weight + 4.799 × height − 5.677 × age
    /// - female: 447.593 + 9.247 × weight + 3.098 × height − 4.330 × age
    ///
    /// Returns 0 when age, height or weight is missing.
    pub fn calculate_bmr(profile: &UserProfile) -> i64 {
        let age = profile.age.filter(|a| *a != 0);
        let height = profile.height.filter(|h| *h != 0.0 && !h.is_nan());
        let (Some(age), Some(height), Some(weight)) = (age, height, profile.current_weight())
        else {
            return 0;
        };
        let age = f64::from(age);

        let bmr = match profile.gender {
            Gender::Male => 88.362 + 13.397 * weight + 4.799 * height - 5.677 * age,
            Gender::Female => 447.593 + 9.247 * weight + 3.098 * height - 4.330 * age,
        };

        round_half_up(bmr)
    }

    /// Total daily energy expenditure: BMR × activity factor
    pub fn calculate_tdee(profile: &UserProfile) -> i64 {
        let bmr = Self::calculate_bmr(profile) as f64;
        round_half_up(bmr * profile.activity_factor())
    }

    /// Caloric surplus on top of TDEE (kcal/day, unrounded)
    ///
    /// Without a gain goal this is the flat 400 kcal. With one, the surplus
    /// follows the weight gap:
    /// - gap ≤ 3 kg: 300 + gap × 33.33
    /// - gap ≤ 8 kg: 400 + (gap − 3) × 20
    /// - otherwise: 500 + (gap − 8) × 10
    ///
    /// capped at 600, then ±10% for high/low activity. The activity nudge only
    /// applies together with a goal.
    pub fn calculate_surplus(profile: &UserProfile) -> f64 {
        let Some(gap) = profile.weight_gap() else {
            return BASE_SURPLUS_KCAL;
        };

        let surplus = if gap <= 3.0 {
            300.0 + gap * 33.33
        } else if gap <= 8.0 {
            400.0 + (gap - 3.0) * 20.0
        } else {
            500.0 + (gap - 8.0) * 10.0
        };
        let surplus = surplus.min(MAX_SURPLUS_KCAL);

        match ActivityBand::of(profile) {
            ActivityBand::High => surplus * 1.1,
            ActivityBand::Low => surplus * 0.9,
            ActivityBand::Mid => surplus,
        }
    }

    /// Daily calorie target for gaining: TDEE + surplus
    pub fn calculate_calories_for_gain(profile: &UserProfile) -> i64 {
        let tdee = Self::calculate_tdee(profile) as f64;
        round_half_up(tdee + Self::calculate_surplus(profile))
    }

    /// Weekly gain rate (kg/week, two decimals)
    ///
    /// Gap spread over the timeframe, clamped into [0.25, max] where max is
    /// 0.4 below 60 kg, 0.6 above 80 kg and 0.5 in between.
    pub fn calculate_weekly_gain_goal(profile: &UserProfile) -> f64 {
        let (Some(weight), Some(gap)) = (profile.current_weight(), profile.weight_gap()) else {
            return FALLBACK_WEEKLY_GAIN;
        };

        let max_weekly_gain = if weight < 60.0 {
            0.4
        } else if weight > 80.0 {
            0.6
        } else {
            0.5
        };

        // A zero timeframe divides to +inf, which clamps to the maximum
        let weekly_gain = gap / f64::from(profile.timeframe);
        let weekly_gain = weekly_gain.min(max_weekly_gain).max(MIN_WEEKLY_GAIN);

        round_to_places(weekly_gain, 2)
    }

    /// Daily protein target (g)
    pub fn calculate_protein(profile: &UserProfile) -> i64 {
        let Some(weight) = profile.current_weight() else {
            return 0;
        };

        let factor = match ActivityBand::of(profile) {
            ActivityBand::High => BASE_PROTEIN_G_PER_KG + 0.1,
            ActivityBand::Low => BASE_PROTEIN_G_PER_KG - 0.1,
            ActivityBand::Mid => BASE_PROTEIN_G_PER_KG,
        };

        let Some(target) = profile.goal_weight().filter(|t| *t > weight) else {
            return round_half_up(weight * factor);
        };

        let average_weight = (weight + target) / 2.0;
        let factor = match TimeframeTier::from_weeks(profile.timeframe) {
            TimeframeTier::Short => (factor + 0.2).min(2.2),
            TimeframeTier::Medium => factor.min(2.0),
            TimeframeTier::Long => (factor - 0.1).min(1.8),
        };

        round_half_up(average_weight * factor)
    }

    /// Share of daily calories allotted to fat
    pub fn fat_ratio(profile: &UserProfile) -> f64 {
        let tier = TimeframeTier::from_weeks(profile.timeframe);
        let ratio = match tier {
            TimeframeTier::Short => 0.28,
            TimeframeTier::Medium => 0.25,
            TimeframeTier::Long => 0.22,
        };

        let Some(gap) = profile.weight_gap() else {
            return ratio;
        };

        match tier {
            TimeframeTier::Short => (ratio + gap * 0.004).max(0.26).min(0.30),
            TimeframeTier::Medium => (ratio + gap * 0.002).max(0.24).min(0.26),
            TimeframeTier::Long => (ratio + gap * 0.003).max(0.20).min(0.23),
        }
    }

    /// Daily fat target (g)
    pub fn calculate_fat(profile: &UserProfile) -> i64 {
        let calories = Self::calculate_calories_for_gain(profile) as f64;
        round_half_up(calories * Self::fat_ratio(profile) / KCAL_PER_G_FAT)
    }

    /// Carbohydrate grams left once protein and fat calories are taken out
    /// of the daily target, before any timeframe scaling
    pub fn calculate_carb_residual(profile: &UserProfile) -> f64 {
        let calories = Self::calculate_calories_for_gain(profile) as f64;
        let protein_calories = Self::calculate_protein(profile) as f64 * KCAL_PER_G_PROTEIN;
        let fat_calories = Self::calculate_fat(profile) as f64 * KCAL_PER_G_FAT;

        (calories - protein_calories - fat_calories) / KCAL_PER_G_CARBS
    }

    /// Timeframe multiplier on the carb residual: 1.03 / 1.08 / 1.15 for
    /// short / medium / long timeframes
    pub fn carb_timeframe_factor(profile: &UserProfile) -> f64 {
        match TimeframeTier::from_weeks(profile.timeframe) {
            TimeframeTier::Short => 1.03,
            TimeframeTier::Medium => 1.08,
            TimeframeTier::Long => 1.15,
        }
    }

    /// Gap multiplier on the carb residual, 1.0 without a gain goal
    ///
    /// Linear in the gap and clamped per tier: [1.05, 1.15] short,
    /// [1.03, 1.10] medium, [1.01, 1.05] long.
    pub fn carb_gap_factor(profile: &UserProfile) -> f64 {
        let Some(gap) = profile.weight_gap() else {
            return 1.0;
        };

        match TimeframeTier::from_weeks(profile.timeframe) {
            TimeframeTier::Short => (1.0 + gap * 0.015).max(1.05).min(1.15),
            TimeframeTier::Medium => (1.0 + gap * 0.01).max(1.03).min(1.1),
            TimeframeTier::Long => (1.0 + gap * 0.005).max(1.01).min(1.05),
        }
    }

    /// Daily carbohydrate target (g): the residual scaled by the timeframe
    /// and gap factors
    pub fn calculate_carbs(profile: &UserProfile) -> i64 {
        let carbs = Self::calculate_carb_residual(profile)
            * Self::carb_timeframe_factor(profile)
            * Self::carb_gap_factor(profile);

        round_half_up(carbs)
    }

    /// Evaluate every derived quantity without touching the profile
    pub fn evaluate(profile: &UserProfile) -> NutritionResult {
        NutritionResult {
            bmr: Self::calculate_bmr(profile),
            tdee: Self::calculate_tdee(profile),
            daily_calories: Self::calculate_calories_for_gain(profile),
            weekly_gain_goal: Self::calculate_weekly_gain_goal(profile),
            protein: Self::calculate_protein(profile),
            carbs: Self::calculate_carbs(profile),
            fat: Self::calculate_fat(profile),
        }
    }

    /// Full recompute: overwrite all seven derived fields and return them
    pub fn calculate_nutrition(profile: &mut UserProfile) -> NutritionResult {
        let result = Self::evaluate(profile);

        profile.bmr = Some(result.bmr);
        profile.tdee = Some(result.tdee);
        profile.daily_calories = Some(result.daily_calories);
        profile.weekly_gain_goal = Some(result.weekly_gain_goal);
        profile.protein = Some(result.protein);
        profile.carbs = Some(result.carbs);
        profile.fat = Some(result.fat);

        debug!(
            bmr = result.bmr,
            tdee = result.tdee,
            daily_calories = result.daily_calories,
            weekly_gain_goal = result.weekly_gain_goal,
            "Nutrition recomputed"
        );

        result
    }

    /// Derived fields stored on the profile, if a recompute has happened
    pub fn cached_result(profile: &UserProfile) -> Option<NutritionResult> {
        Some(NutritionResult {
            bmr: profile.bmr?,
            tdee: profile.tdee?,
            daily_calories: profile.daily_calories?,
            weekly_gain_goal: profile.weekly_gain_goal?,
            protein: profile.protein?,
            carbs: profile.carbs?,
            fat: profile.fat?,
        })
    }

    /// True when the stored derived fields no longer match the inputs
    pub fn is_stale(profile: &UserProfile) -> bool {
        Self::cached_result(profile) != Some(Self::evaluate(profile))
    }

    /// Weeks needed to reach the target at the weekly gain rate; 0 without a goal
    pub fn calculate_time_to_goal(profile: &UserProfile) -> u32 {
        let Some(gap) = profile.weight_gap() else {
            return 0;
        };
        let weekly_gain = Self::calculate_weekly_gain_goal(profile);

        (gap / weekly_gain).ceil() as u32
    }

    /// Week-by-week projected weight, starting at the current weight
    ///
    /// Spans the goal timeframe, or the time to goal when the timeframe is 0.
    /// Empty when either weight is missing.
    pub fn generate_weight_projection(profile: &UserProfile) -> WeightProjection {
        let (Some(weight), Some(_)) = (profile.current_weight(), profile.goal_weight()) else {
            return WeightProjection::empty();
        };

        let weeks = match profile.timeframe {
            0 => Self::calculate_time_to_goal(profile),
            weeks => weeks,
        };

        WeightProjection::new(weight, Self::calculate_weekly_gain_goal(profile), weeks)
    }
}

/// Round to the nearest integer, ties toward +∞
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Round to `places` decimals on the exact binary value, ties away from zero
pub(crate) fn round_to_places(value: f64, places: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityLevel;

    fn profile(gender: Gender, age: u32, height: f64, weight: f64) -> UserProfile {
        UserProfile {
            gender,
            age: Some(age),
            height: Some(height),
            weight: Some(weight),
            ..Default::default()
        }
    }

    fn gain_profile() -> UserProfile {
        let mut p = profile(Gender::Male, 25, 175.0, 60.0);
        p.target_weight = Some(65.0);
        p.timeframe = 8;
        p
    }

    #[test]
    fn test_bmr_male() {
        // 88.362 + 803.82 + 839.825 - 141.925 = 1590.082
        let p = profile(Gender::Male, 25, 175.0, 60.0);
        assert_eq!(NutritionEngine::calculate_bmr(&p), 1590);
    }

    #[test]
    fn test_bmr_female() {
        // 447.593 + 462.35 + 495.68 - 129.9 = 1275.723
        let p = profile(Gender::Female, 30, 160.0, 50.0);
        assert_eq!(NutritionEngine::calculate_bmr(&p), 1276);
    }

    #[test]
    fn test_bmr_missing_inputs_is_zero() {
        let mut p = profile(Gender::Male, 25, 175.0, 60.0);
        p.age = None;
        assert_eq!(NutritionEngine::calculate_bmr(&p), 0);

        let mut p = profile(Gender::Male, 25, 175.0, 60.0);
        p.age = Some(0);
        assert_eq!(NutritionEngine::calculate_bmr(&p), 0);

        let mut p = profile(Gender::Female, 25, 175.0, 60.0);
        p.height = Some(0.0);
        assert_eq!(NutritionEngine::calculate_bmr(&p), 0);

        let mut p = profile(Gender::Female, 25, 175.0, 60.0);
        p.weight = Some(f64::NAN);
        assert_eq!(NutritionEngine::calculate_bmr(&p), 0);
        assert_eq!(NutritionEngine::calculate_tdee(&p), 0);
    }

    #[test]
    fn test_tdee_by_activity() {
        let mut p = profile(Gender::Male, 25, 175.0, 60.0);
        // 1590 × 1.55 = 2464.5 → 2465
        assert_eq!(NutritionEngine::calculate_tdee(&p), 2465);

        p.activity_level = Some(ActivityLevel::Sedentary);
        assert_eq!(NutritionEngine::calculate_tdee(&p), 1908);

        p.activity_level = Some(ActivityLevel::VeryActive);
        assert_eq!(NutritionEngine::calculate_tdee(&p), 3021);

        p.activity_level = None;
        assert_eq!(NutritionEngine::calculate_tdee(&p), 2465);
    }

    #[test]
    fn test_daily_calories_without_goal() {
        let p = profile(Gender::Male, 25, 175.0, 60.0);
        assert_eq!(NutritionEngine::calculate_surplus(&p), 400.0);
        assert_eq!(NutritionEngine::calculate_calories_for_gain(&p), 2865);
    }

    #[test]
    fn test_daily_calories_with_goal() {
        let p = gain_profile();
        // gap 5 kg → 400 + 2 × 20 = 440, moderate activity keeps it
        assert_eq!(NutritionEngine::calculate_surplus(&p), 440.0);
        assert_eq!(NutritionEngine::calculate_calories_for_gain(&p), 2905);
    }

    #[test]
    fn test_surplus_tiers_and_cap() {
        let mut p = gain_profile();

        p.target_weight = Some(62.0);
        assert!((NutritionEngine::calculate_surplus(&p) - 366.66).abs() < 1e-9);

        p.target_weight = Some(68.0);
        assert_eq!(NutritionEngine::calculate_surplus(&p), 500.0);

        p.target_weight = Some(75.0);
        assert_eq!(NutritionEngine::calculate_surplus(&p), 570.0);

        p.target_weight = Some(90.0);
        assert_eq!(NutritionEngine::calculate_surplus(&p), 600.0);
    }

    #[test]
    fn test_surplus_activity_adjustment_only_with_goal() {
        let mut p = gain_profile();
        p.activity_level = Some(ActivityLevel::Active);
        assert!((NutritionEngine::calculate_surplus(&p) - 484.0).abs() < 1e-9);

        p.activity_level = Some(ActivityLevel::Light);
        assert!((NutritionEngine::calculate_surplus(&p) - 396.0).abs() < 1e-9);

        p.target_weight = None;
        assert_eq!(NutritionEngine::calculate_surplus(&p), 400.0);
    }

    #[test]
    fn test_weekly_gain_goal() {
        let mut p = gain_profile();
        // 5 / 8 = 0.625, capped to 0.5 at 60 kg
        assert_eq!(NutritionEngine::calculate_weekly_gain_goal(&p), 0.5);

        p.weight = Some(55.0);
        p.target_weight = Some(65.0);
        assert_eq!(NutritionEngine::calculate_weekly_gain_goal(&p), 0.4);

        p.weight = Some(85.0);
        p.target_weight = Some(95.0);
        assert_eq!(NutritionEngine::calculate_weekly_gain_goal(&p), 0.6);

        p.weight = Some(70.0);
        p.target_weight = Some(71.0);
        assert_eq!(NutritionEngine::calculate_weekly_gain_goal(&p), 0.25);

        p.target_weight = Some(73.0);
        p.timeframe = 9;
        assert_eq!(NutritionEngine::calculate_weekly_gain_goal(&p), 0.33);
    }

    #[test]
    fn test_weekly_gain_goal_fallbacks() {
        let mut p = gain_profile();
        p.target_weight = None;
        assert_eq!(NutritionEngine::calculate_weekly_gain_goal(&p), 0.4);

        p.target_weight = Some(60.0);
        assert_eq!(NutritionEngine::calculate_weekly_gain_goal(&p), 0.4);

        p.target_weight = Some(65.0);
        p.timeframe = 0;
        assert_eq!(NutritionEngine::calculate_weekly_gain_goal(&p), 0.5);
    }

    #[test]
    fn test_protein() {
        let p = gain_profile();
        // (60 + 65) / 2 × 1.9 = 118.75
        assert_eq!(NutritionEngine::calculate_protein(&p), 119);

        let mut p = gain_profile();
        p.timeframe = 4;
        // min(2.2, 2.1) × 62.5 = 131.25
        assert_eq!(NutritionEngine::calculate_protein(&p), 131);

        p.activity_level = Some(ActivityLevel::VeryActive);
        p.timeframe = 10;
        // min(2.0, 2.0) × 62.5
        assert_eq!(NutritionEngine::calculate_protein(&p), 125);

        p.activity_level = Some(ActivityLevel::Moderate);
        p.target_weight = Some(66.0);
        p.timeframe = 16;
        // min(1.8, 1.8) × 63 = 113.4
        assert_eq!(NutritionEngine::calculate_protein(&p), 113);
    }

    #[test]
    fn test_protein_without_goal_still_adjusts_for_activity() {
        let mut p = profile(Gender::Male, 25, 175.0, 60.0);
        assert_eq!(NutritionEngine::calculate_protein(&p), 114);

        p.activity_level = Some(ActivityLevel::Active);
        assert_eq!(NutritionEngine::calculate_protein(&p), 120);

        p.activity_level = Some(ActivityLevel::Sedentary);
        assert_eq!(NutritionEngine::calculate_protein(&p), 108);

        p.weight = None;
        assert_eq!(NutritionEngine::calculate_protein(&p), 0);
    }

    #[test]
    fn test_fat_ratio_tiers() {
        let mut p = profile(Gender::Male, 25, 175.0, 60.0);
        p.timeframe = 6;
        assert_eq!(NutritionEngine::fat_ratio(&p), 0.28);
        p.timeframe = 12;
        assert_eq!(NutritionEngine::fat_ratio(&p), 0.25);
        p.timeframe = 13;
        assert_eq!(NutritionEngine::fat_ratio(&p), 0.22);

        p.target_weight = Some(80.0);
        p.timeframe = 4;
        assert_eq!(NutritionEngine::fat_ratio(&p), 0.30);
        p.timeframe = 10;
        assert_eq!(NutritionEngine::fat_ratio(&p), 0.26);
        p.timeframe = 20;
        assert_eq!(NutritionEngine::fat_ratio(&p), 0.23);
    }

    #[test]
    fn test_fat_and_carbs() {
        let p = gain_profile();
        // 2905 × 0.26 / 9 = 83.92
        assert_eq!(NutritionEngine::calculate_fat(&p), 84);
        // (2905 - 476 - 756) / 4 = 418.25
        assert_eq!(NutritionEngine::calculate_carb_residual(&p), 418.25);
        // 418.25 × 1.08 × 1.05 = 474.3
        assert_eq!(NutritionEngine::calculate_carbs(&p), 474);
    }

    #[test]
    fn test_carb_factors_by_tier() {
        let mut p = profile(Gender::Male, 25, 175.0, 60.0);

        p.timeframe = 4;
        assert_eq!(NutritionEngine::carb_timeframe_factor(&p), 1.03);
        assert_eq!(NutritionEngine::carb_gap_factor(&p), 1.0);
        p.timeframe = 8;
        assert_eq!(NutritionEngine::carb_timeframe_factor(&p), 1.08);
        p.timeframe = 16;
        assert_eq!(NutritionEngine::carb_timeframe_factor(&p), 1.15);
        assert_eq!(NutritionEngine::carb_gap_factor(&p), 1.0);
    }

    #[test]
    fn test_carb_gap_factor_band_edges() {
        let mut p = gain_profile();

        // Short tier: 1 + gap × 0.015 within [1.05, 1.15]
        p.timeframe = 4;
        p.target_weight = Some(61.0);
        assert_eq!(NutritionEngine::carb_gap_factor(&p), 1.05);
        p.target_weight = Some(65.0);
        assert!((NutritionEngine::carb_gap_factor(&p) - 1.075).abs() < 1e-9);
        p.target_weight = Some(75.0);
        assert_eq!(NutritionEngine::carb_gap_factor(&p), 1.15);

        // Medium tier: 1 + gap × 0.01 within [1.03, 1.10]
        p.timeframe = 8;
        p.target_weight = Some(61.0);
        assert_eq!(NutritionEngine::carb_gap_factor(&p), 1.03);
        p.target_weight = Some(80.0);
        assert_eq!(NutritionEngine::carb_gap_factor(&p), 1.1);

        // Long tier: 1 + gap × 0.005 within [1.01, 1.05]
        p.timeframe = 16;
        p.target_weight = Some(61.0);
        assert_eq!(NutritionEngine::carb_gap_factor(&p), 1.01);
        p.target_weight = Some(66.0);
        assert!((NutritionEngine::carb_gap_factor(&p) - 1.03).abs() < 1e-9);
        p.target_weight = Some(80.0);
        assert_eq!(NutritionEngine::carb_gap_factor(&p), 1.05);
    }

    #[test]
    fn test_carbs_without_goal() {
        let mut p = profile(Gender::Male, 25, 175.0, 60.0);

        // (2865 - 456 - 801) / 4 = 402, × 1.03 = 414.06
        p.timeframe = 4;
        assert_eq!(NutritionEngine::calculate_carb_residual(&p), 402.0);
        assert_eq!(NutritionEngine::calculate_carbs(&p), 414);

        // (2865 - 456 - 630) / 4 = 444.75, × 1.15 = 511.46
        p.timeframe = 16;
        assert_eq!(NutritionEngine::calculate_carb_residual(&p), 444.75);
        assert_eq!(NutritionEngine::calculate_carbs(&p), 511);
    }

    #[test]
    fn test_carbs_short_timeframe_with_goal() {
        let mut p = gain_profile();
        p.timeframe = 4;

        // 377 × 1.03 × 1.075 = 417.43
        assert_eq!(NutritionEngine::calculate_carb_residual(&p), 377.0);
        assert_eq!(NutritionEngine::calculate_carbs(&p), 417);

        // gap 1: factor clamps up to 1.05; 374.5 × 1.03 × 1.05 = 405.02
        p.target_weight = Some(61.0);
        assert_eq!(NutritionEngine::calculate_carb_residual(&p), 374.5);
        assert_eq!(NutritionEngine::calculate_carbs(&p), 405);

        // gap 15: factor clamps down to 1.15; 389.5 × 1.03 × 1.15 = 461.36
        p.target_weight = Some(75.0);
        assert_eq!(NutritionEngine::calculate_carb_residual(&p), 389.5);
        assert_eq!(NutritionEngine::calculate_carbs(&p), 461);
    }

    #[test]
    fn test_carbs_long_timeframe_with_goal() {
        let mut p = gain_profile();
        p.timeframe = 16;

        // (2925 - 452 - 675) / 4 = 449.5, × 1.15 × 1.03 = 532.43
        p.target_weight = Some(66.0);
        assert_eq!(NutritionEngine::calculate_carb_residual(&p), 449.5);
        assert_eq!(NutritionEngine::calculate_carbs(&p), 532);

        // gap 1: factor clamps up to 1.01; 435.25 × 1.15 × 1.01 = 505.54
        p.target_weight = Some(61.0);
        assert_eq!(NutritionEngine::calculate_carb_residual(&p), 435.25);
        assert_eq!(NutritionEngine::calculate_carbs(&p), 506);

        // gap 20: factor clamps down to 1.05; 464.75 × 1.15 × 1.05 = 561.19
        p.target_weight = Some(80.0);
        assert_eq!(NutritionEngine::calculate_carb_residual(&p), 464.75);
        assert_eq!(NutritionEngine::calculate_carbs(&p), 561);
    }

    #[test]
    fn test_calculate_nutrition_writes_profile() {
        let mut p = gain_profile();
        assert!(NutritionEngine::cached_result(&p).is_none());
        assert!(NutritionEngine::is_stale(&p));

        let result = NutritionEngine::calculate_nutrition(&mut p);

        assert_eq!(result.bmr, 1590);
        assert_eq!(result.tdee, 2465);
        assert_eq!(result.daily_calories, 2905);
        assert_eq!(result.weekly_gain_goal, 0.5);
        assert_eq!(p.daily_calories, Some(2905));
        assert_eq!(p.carbs, Some(result.carbs));
        assert_eq!(NutritionEngine::cached_result(&p), Some(result));
        assert!(!NutritionEngine::is_stale(&p));

        p.weight = Some(61.0);
        assert!(NutritionEngine::is_stale(&p));
    }

    #[test]
    fn test_time_to_goal() {
        let mut p = gain_profile();
        assert_eq!(NutritionEngine::calculate_time_to_goal(&p), 10);

        p.target_weight = Some(60.3);
        assert_eq!(NutritionEngine::calculate_time_to_goal(&p), 2);

        p.target_weight = None;
        assert_eq!(NutritionEngine::calculate_time_to_goal(&p), 0);
    }

    #[test]
    fn test_projection_uses_time_to_goal_without_timeframe() {
        let mut p = gain_profile();
        p.timeframe = 0;
        let points = NutritionEngine::generate_weight_projection(&p).points();
        assert_eq!(points.len(), 11);
        assert_eq!(points[10].weight, 65.0);
    }

    #[test]
    fn test_projection_without_gain_goal_uses_fallback_rate() {
        let mut p = gain_profile();
        p.target_weight = Some(58.0);
        let points = NutritionEngine::generate_weight_projection(&p).points();
        assert_eq!(points.len(), 9);
        assert_eq!(points[1].weight, 60.4);
        assert_eq!(points[8].weight, 63.2);
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round_half_up(2464.5), 2465);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(118.49), 118);
        assert_eq!(round_to_places(0.625, 2), 0.63);
        assert_eq!(round_to_places(0.333333, 2), 0.33);
        assert_eq!(round_to_places(63.2000000001, 1), 63.2);
    }
}
