use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Activity factor used whenever the activity level is unknown or missing
pub const DEFAULT_ACTIVITY_FACTOR: f64 = 1.55;

/// Default goal timeframe in weeks
pub const DEFAULT_TIMEFRAME_WEEKS: u32 = 8;

/// Biological sex used to pick the BMR equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// Anything that is not `"male"` selects the female equation.
    fn from_stored(value: &str) -> Self {
        if value == "male" {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<StoredScalar>::deserialize(deserializer)? {
            Some(StoredScalar::Text(value)) => Ok(Gender::from_stored(&value)),
            _ => Ok(Gender::Female),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// Self-reported physical activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Physical job or twice-daily training
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    /// TDEE multiplier for this level
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" | "veryactive" => Ok(ActivityLevel::VeryActive),
            _ => Err(format!("Invalid activity level: {}", s)),
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single profile record the engine operates on.
///
/// Serialized with the same camelCase keys the stored `user-data` payload uses.
/// Every field is optional on read; missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub gender: Gender,
    /// Fractional stored ages are rounded to whole years
    #[serde(deserialize_with = "lenient_whole")]
    pub age: Option<u32>,
    /// Height in centimeters
    #[serde(deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    /// Current weight in kilograms
    #[serde(deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    /// `None` when the stored level was missing or not recognised
    #[serde(deserialize_with = "lenient_activity_level")]
    pub activity_level: Option<ActivityLevel>,

    /// Goal weight in kilograms
    #[serde(deserialize_with = "lenient_number")]
    pub target_weight: Option<f64>,
    /// Goal timeframe in weeks. A stored `null` reads as 0, which makes the
    /// projection span the time to goal.
    #[serde(deserialize_with = "lenient_timeframe")]
    pub timeframe: u32,

    // Derived fields, written only by a full recompute
    #[serde(deserialize_with = "lenient_integer")]
    pub bmr: Option<i64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub tdee: Option<i64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub daily_calories: Option<i64>,
    #[serde(deserialize_with = "lenient_number")]
    pub weekly_gain_goal: Option<f64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub protein: Option<i64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub carbs: Option<i64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub fat: Option<i64>,
}

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            gender: Gender::Male,
            age: None,
            height: None,
            weight: None,
            activity_level: Some(ActivityLevel::Moderate),
            target_weight: None,
            timeframe: DEFAULT_TIMEFRAME_WEEKS,
            bmr: None,
            tdee: None,
            daily_calories: None,
            weekly_gain_goal: None,
            protein: None,
            carbs: None,
            fat: None,
        }
    }
}

/// A stored scalar of any JSON type.
///
/// Profile fields are read through this so one mistyped value degrades that
/// field alone instead of failing the whole payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredScalar {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl StoredScalar {
    fn as_number(&self) -> Option<f64> {
        let value = match self {
            StoredScalar::Number(n) => Some(*n),
            StoredScalar::Text(text) => text.trim().parse::<f64>().ok(),
            StoredScalar::Other(_) => None,
        };
        value.filter(|n| n.is_finite())
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StoredScalar>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(StoredScalar::as_number))
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_number(deserializer)?;
    Ok(value
        .map(f64::round)
        .filter(|n| (i64::MIN as f64..=i64::MAX as f64).contains(n))
        .map(|n| n as i64))
}

fn lenient_whole<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_number(deserializer)?;
    Ok(value
        .map(f64::round)
        .filter(|n| (0.0..=f64::from(u32::MAX)).contains(n))
        .map(|n| n as u32))
}

fn lenient_timeframe<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_whole(deserializer)?.unwrap_or(0))
}

fn lenient_activity_level<'de, D>(deserializer: D) -> Result<Option<ActivityLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StoredScalar>::deserialize(deserializer)? {
        Some(StoredScalar::Text(level)) => Ok(level.parse().ok()),
        _ => Ok(None),
    }
}

/// Wraps a present field in `Some` so `null` and "absent" stay distinguishable
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Partial update of the biometric inputs.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicInfoUpdate {
    pub gender: Option<Gender>,
    #[serde(deserialize_with = "present")]
    pub age: Option<Option<u32>>,
    #[serde(deserialize_with = "present")]
    pub height: Option<Option<f64>>,
    #[serde(deserialize_with = "present")]
    pub weight: Option<Option<f64>>,
    #[serde(deserialize_with = "present")]
    pub activity_level: Option<Option<ActivityLevel>>,
}

impl BasicInfoUpdate {
    pub fn is_empty(&self) -> bool {
        self == &BasicInfoUpdate::default()
    }
}

/// Partial update of the goal settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalSettingsUpdate {
    #[serde(deserialize_with = "present")]
    pub target_weight: Option<Option<f64>>,
    pub timeframe: Option<u32>,
}

impl GoalSettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self == &GoalSettingsUpdate::default()
    }
}

impl UserProfile {
    /// Shallow-merge biometric inputs. Returns true when any input changed.
    pub fn apply_basic_info(&mut self, update: &BasicInfoUpdate) -> bool {
        let before = self.inputs();

        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(level) = update.activity_level {
            self.activity_level = level;
        }

        before != self.inputs()
    }

    /// Shallow-merge goal settings. Returns true when any input changed.
    pub fn apply_goal_settings(&mut self, update: &GoalSettingsUpdate) -> bool {
        let before = self.inputs();

        if let Some(target) = update.target_weight {
            self.target_weight = target;
        }
        if let Some(timeframe) = update.timeframe {
            self.timeframe = timeframe;
        }

        before != self.inputs()
    }

    /// TDEE multiplier, falling back to the moderate factor when unknown
    pub fn activity_factor(&self) -> f64 {
        self.activity_level
            .map(|level| level.factor())
            .unwrap_or(DEFAULT_ACTIVITY_FACTOR)
    }

    /// Current weight if usable (set, non-zero, not NaN)
    pub fn current_weight(&self) -> Option<f64> {
        usable(self.weight)
    }

    /// Target weight if usable (set, non-zero, not NaN)
    pub fn goal_weight(&self) -> Option<f64> {
        usable(self.target_weight)
    }

    /// Weight still to gain, only when a valid gain goal exists
    pub fn weight_gap(&self) -> Option<f64> {
        match (self.current_weight(), self.goal_weight()) {
            (Some(weight), Some(target)) if target > weight => Some(target - weight),
            _ => None,
        }
    }

    pub fn has_gain_goal(&self) -> bool {
        self.weight_gap().is_some()
    }

    /// Clear the seven derived fields
    pub fn clear_derived(&mut self) {
        self.bmr = None;
        self.tdee = None;
        self.daily_calories = None;
        self.weekly_gain_goal = None;
        self.protein = None;
        self.carbs = None;
        self.fat = None;
    }

    fn inputs(&self) -> ProfileInputs {
        ProfileInputs {
            gender: self.gender,
            age: self.age,
            height: self.height,
            weight: self.weight,
            activity_level: self.activity_level,
            target_weight: self.target_weight,
            timeframe: self.timeframe,
        }
    }
}

#[derive(PartialEq)]
struct ProfileInputs {
    gender: Gender,
    age: Option<u32>,
    height: Option<f64>,
    weight: Option<f64>,
    activity_level: Option<ActivityLevel>,
    target_weight: Option<f64>,
    timeframe: u32,
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// The seven derived quantities of a full recompute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionResult {
    /// Basal metabolic rate (kcal/day)
    pub bmr: i64,
    /// Total daily energy expenditure (kcal/day)
    pub tdee: i64,
    /// Daily intake target for gaining (kcal/day)
    pub daily_calories: i64,
    /// Target gain rate (kg/week)
    pub weekly_gain_goal: f64,
    /// Protein (g/day)
    pub protein: i64,
    /// Carbohydrate (g/day)
    pub carbs: i64,
    /// Fat (g/day)
    pub fat: i64,
}

/// One week of the projected weight curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub week: u32,
    /// Projected weight in kilograms, one decimal
    pub weight: f64,
}
