//! The priority scale.
//!
//! Every ordered collection in the framework (route tiers, component search
//! paths, view-method candidates and hook listeners) is bucketed by a
//! [`Priority`]. Buckets are always visited in the order of the scale, from
//! [`Priority::Monitor`] to [`Priority::Lowest`], never in insertion order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordering bucket.
///
/// The derived `Ord` follows the visiting order: `Monitor < Highest < ... < Lowest`,
/// so sorting ascending yields the order in which tiers are searched.
///
/// # Examples
///
/// ```
/// use mvcr_core::Priority;
///
/// let order: Vec<Priority> = Priority::all().collect();
/// assert_eq!(order.first(), Some(&Priority::Monitor));
/// assert_eq!(order.last(), Some(&Priority::Lowest));
/// assert!(Priority::High < Priority::Normal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Visited before everything else. Intended for observers.
    Monitor,
    /// The most specific overrides.
    Highest,
    /// Overrides.
    High,
    /// The default tier.
    #[default]
    Normal,
    /// Fallbacks.
    Low,
    /// Framework defaults, visited last.
    Lowest,
}

impl Priority {
    const SCALE: [Self; 6] = [
        Self::Monitor,
        Self::Highest,
        Self::High,
        Self::Normal,
        Self::Low,
        Self::Lowest,
    ];

    /// Iterates the whole scale in visiting order.
    pub fn all() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        Self::SCALE.into_iter()
    }

    /// The first tier visited.
    pub const fn highest() -> Self {
        Self::Monitor
    }

    /// The last tier visited.
    pub const fn lowest() -> Self {
        Self::Lowest
    }

    /// Returns the numeric tier (0 for `Monitor` through 5 for `Lowest`).
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Looks up a tier by its numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        Self::SCALE.get(usize::from(value)).copied()
    }

    /// Returns the lower-case name used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monitor => "monitor",
            Self::Highest => "highest",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Lowest => "lowest",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
