//! Week-by-week weight projection
//!
//! A [`WeightProjection`] only describes the curve (start weight, weekly gain,
//! number of weeks); iterating it yields [`ProjectionPoint`]s and can be
//! repeated any number of times.

use crate::models::ProjectionPoint;
use crate::nutrition::round_to_places;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightProjection {
    start_weight: f64,
    weekly_gain: f64,
    weeks: u32,
    empty: bool,
}

impl WeightProjection {
    /// Curve over weeks `0..=weeks`
    pub fn new(start_weight: f64, weekly_gain: f64, weeks: u32) -> Self {
        WeightProjection {
            start_weight,
            weekly_gain,
            weeks,
            empty: false,
        }
    }

    /// Projection with no points, used when there is nothing to project
    pub fn empty() -> Self {
        WeightProjection {
            start_weight: 0.0,
            weekly_gain: 0.0,
            weeks: 0,
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Number of points, i.e. `weeks + 1` unless empty
    pub fn len(&self) -> usize {
        if self.empty {
            0
        } else {
            self.weeks as usize + 1
        }
    }

    pub fn weeks(&self) -> u32 {
        self.weeks
    }

    pub fn weekly_gain(&self) -> f64 {
        self.weekly_gain
    }

    pub fn iter(&self) -> ProjectionIter {
        ProjectionIter {
            week: 0,
            current: self.start_weight,
            weekly_gain: self.weekly_gain,
            remaining: self.len(),
        }
    }

    pub fn points(&self) -> Vec<ProjectionPoint> {
        self.iter().collect()
    }

    pub fn last(&self) -> Option<ProjectionPoint> {
        self.iter().last()
    }
}

impl IntoIterator for WeightProjection {
    type Item = ProjectionPoint;
    type IntoIter = ProjectionIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &WeightProjection {
    type Item = ProjectionPoint;
    type IntoIter = ProjectionIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`WeightProjection`]
#[derive(Debug, Clone)]
pub struct ProjectionIter {
    week: u32,
    current: f64,
    weekly_gain: f64,
    remaining: usize,
}

impl Iterator for ProjectionIter {
    type Item = ProjectionPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let point = ProjectionPoint {
            week: self.week,
            weight: round_to_places(self.current, 1),
        };

        // Running sum, not start + week × gain
        self.current += self.weekly_gain;
        self.week += 1;
        self.remaining -= 1;

        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProjectionIter {}
