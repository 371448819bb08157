//! Activity (run) context and validity intervals stamped onto published objects.

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type ValidityTime = u64;

/// Closed interval `[min, max]` of validity timestamps.
///
/// An interval with `min > max` is "unset"; the first update replaces it.
///
/// # Examples
///
/// ```
/// use mopub::ValidityInterval;
///
/// let mut v = ValidityInterval::unset();
/// v.update(100);
/// v.update(50);
/// assert_eq!(v, ValidityInterval::new(50, 100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidityInterval {
    /// Earliest timestamp (inclusive).
    pub min: ValidityTime,
    /// Latest timestamp (inclusive).
    pub max: ValidityTime,
}

impl ValidityInterval {
    /// Creates an interval from its bounds.
    #[must_use]
    pub const fn new(min: ValidityTime, max: ValidityTime) -> Self {
        Self { min, max }
    }

    /// The neutral interval that any update replaces.
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            min: ValidityTime::MAX,
            max: ValidityTime::MIN,
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Extends the interval so it contains `time`.
    pub fn update(&mut self, time: ValidityTime) {
        if self.is_valid() {
            self.min = self.min.min(time);
            self.max = self.max.max(time);
        } else {
            self.min = time;
            self.max = time;
        }
    }

    #[must_use]
    pub const fn contains(&self, time: ValidityTime) -> bool {
        self.is_valid() && self.min <= time && time <= self.max
    }
}

impl Default for ValidityInterval {
    fn default() -> Self {
        Self::unset()
    }
}

/// Data-taking context a task is running under.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Activity {
    /// Run number, 0 when unknown.
    #[serde(default)]
    pub run_number: u64,
    /// Run type (e.g. `PHYSICS`, `COSMICS`).
    #[serde(default)]
    pub activity_type: String,
    /// Data-taking period name.
    #[serde(default)]
    pub period_name: String,
    /// Reconstruction pass name.
    #[serde(default)]
    pub pass_name: String,
    /// Where the data comes from (e.g. `qc`, `qc_mc`).
    #[serde(default)]
    pub provenance: String,
    /// Validity of the activity itself.
    #[serde(default)]
    pub validity: ValidityInterval,
}

impl Activity {
    /// Creates an activity for a run number with default provenance.
    #[must_use]
    pub fn for_run(run_number: u64) -> Self {
        Self {
            run_number,
            provenance: "qc".to_string(),
            ..Self::default()
        }
    }
}
