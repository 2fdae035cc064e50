//! Profile session: the profile, its store and the operations the wizard steps
//! drive (update basic info, update goal, calculate, project).

use tracing::{debug, info};

use crate::error::Result;
use crate::models::{BasicInfoUpdate, GoalSettingsUpdate, NutritionResult, UserProfile};
use crate::nutrition::NutritionEngine;
use crate::projection::WeightProjection;
use crate::store::{load_profile, save_profile, KeyValueStore, USER_DATA_KEY};

/// Owns one profile and persists it on every change
pub struct PlanSession<S: KeyValueStore> {
    store: S,
    key: String,
    profile: UserProfile,
}

impl<S: KeyValueStore> PlanSession<S> {
    /// Open a session on the default `user-data` key
    pub fn open(store: S) -> Result<Self> {
        Self::open_with_key(store, USER_DATA_KEY)
    }

    /// Load (or default) the profile stored under `key`
    pub fn open_with_key(store: S, key: &str) -> Result<Self> {
        let profile = load_profile(&store, key)?;
        debug!(key, "Session opened");

        Ok(PlanSession {
            store,
            key: key.to_string(),
            profile,
        })
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Merge biometric inputs and save. Returns true when anything changed.
    pub fn update_user_info(&mut self, update: &BasicInfoUpdate) -> Result<bool> {
        let changed = self.profile.apply_basic_info(update);
        self.persist()?;
        Ok(changed)
    }

    /// Merge goal settings and save. Returns true when anything changed.
    pub fn update_goal_settings(&mut self, update: &GoalSettingsUpdate) -> Result<bool> {
        let changed = self.profile.apply_goal_settings(update);
        self.persist()?;
        Ok(changed)
    }

    /// Recompute all derived fields and save them with the profile
    pub fn calculate_nutrition(&mut self) -> Result<NutritionResult> {
        let result = NutritionEngine::calculate_nutrition(&mut self.profile);
        self.persist()?;
        info!(daily_calories = result.daily_calories, "Nutrition plan updated");
        Ok(result)
    }

    /// Derived fields from the last recompute, if any
    pub fn cached_result(&self) -> Option<NutritionResult> {
        NutritionEngine::cached_result(&self.profile)
    }

    pub fn is_stale(&self) -> bool {
        NutritionEngine::is_stale(&self.profile)
    }

    pub fn time_to_goal(&self) -> u32 {
        NutritionEngine::calculate_time_to_goal(&self.profile)
    }

    pub fn weight_projection(&self) -> WeightProjection {
        NutritionEngine::generate_weight_projection(&self.profile)
    }

    /// Back to the default profile; the stored payload is removed
    pub fn reset(&mut self) -> Result<()> {
        self.profile = UserProfile::default();
        self.store.remove(&self.key)?;
        info!(key = %self.key, "Profile reset");
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        save_profile(&mut self.store, &self.key, &self.profile)
    }
}
