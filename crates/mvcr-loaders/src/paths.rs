//! Priority-tiered search directories.
//!
//! A [`PriorityPathSet`] maps each [`Priority`] tier to an ordered list of
//! directories. Iteration visits tiers in priority order and, within a tier,
//! directories in the order they were added. All three resolvers use it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mvcr_core::settings::PathSetting;
use mvcr_core::Priority;

/// Ordered search directories grouped by priority tier.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mvcr_core::Priority;
/// use mvcr_loaders::PriorityPathSet;
///
/// let mut paths = PriorityPathSet::new();
/// paths.add("vendor/controllers", Priority::Low);
/// paths.add("app/controllers", Priority::High);
///
/// let order: Vec<&Path> = paths.iter().map(|(_, dir)| dir).collect();
/// assert_eq!(order, vec![Path::new("app/controllers"), Path::new("vendor/controllers")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityPathSet {
    tiers: BTreeMap<Priority, Vec<PathBuf>>,
}

impl PriorityPathSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding `dirs` in a single tier.
    ///
    /// Used for explicit paths passed straight into a resolver call.
    pub fn single<I, P>(priority: Priority, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut set = Self::new();
        for dir in dirs {
            set.add(dir, priority);
        }
        set
    }

    /// Builds a set from configured path entries, keeping their order.
    pub fn from_settings(settings: &[PathSetting]) -> Self {
        let mut set = Self::new();
        for entry in settings {
            set.add(entry.path.clone(), entry.priority);
        }
        set
    }

    /// Appends `dir` to the `priority` tier.
    ///
    /// Returns `false` (and changes nothing) if the tier already holds `dir`.
    pub fn add(&mut self, dir: impl Into<PathBuf>, priority: Priority) -> bool {
        let dir = dir.into();
        let tier = self.tiers.entry(priority).or_default();
        if tier.contains(&dir) {
            return false;
        }
        tier.push(dir);
        true
    }

    /// Removes `dir` from the `priority` tier. Returns `false` if it was absent.
    pub fn remove(&mut self, dir: impl AsRef<Path>, priority: Priority) -> bool {
        let dir = dir.as_ref();
        let Some(tier) = self.tiers.get_mut(&priority) else {
            return false;
        };
        let Some(index) = tier.iter().position(|d| d == dir) else {
            return false;
        };
        tier.remove(index);
        if tier.is_empty() {
            self.tiers.remove(&priority);
        }
        true
    }

    /// The directories of one tier, in search order.
    pub fn tier(&self, priority: Priority) -> &[PathBuf] {
        self.tiers.get(&priority).map_or(&[], Vec::as_slice)
    }

    /// Iterates `(tier, directory)` pairs in search order.
    pub fn iter(&self) -> impl Iterator<Item = (Priority, &Path)> {
        self.tiers
            .iter()
            .flat_map(|(priority, dirs)| dirs.iter().map(move |dir| (*priority, dir.as_path())))
    }

    /// Iterates every directory regardless of tier, in search order.
    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.iter().map(|(_, dir)| dir)
    }

    /// Total number of directories across all tiers.
    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    /// Returns `true` if no tier holds a directory.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every directory.
    pub fn clear(&mut self) {
        self.tiers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_follows_tiers_not_insertion() {
        let mut set = PriorityPathSet::new();
        set.add("lowest", Priority::Lowest);
        set.add("normal-a", Priority::Normal);
        set.add("monitor", Priority::Monitor);
        set.add("normal-b", Priority::Normal);

        let order: Vec<_> = set.directories().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(order, vec!["monitor", "normal-a", "normal-b", "lowest"]);
    }

    #[test]
    fn test_add_duplicate_in_same_tier() {
        let mut set = PriorityPathSet::new();
        assert!(set.add("app", Priority::Normal));
        assert!(!set.add("app", Priority::Normal));
        assert!(set.add("app", Priority::High));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut set = PriorityPathSet::new();
        set.add("app", Priority::Normal);
        assert!(!set.remove("app", Priority::High));
        assert!(!set.remove("other", Priority::Normal));
        assert!(set.remove("app", Priority::Normal));
        assert!(set.is_empty());
        assert!(set.tier(Priority::Normal).is_empty());
    }

    #[test]
    fn test_tier() {
        let mut set = PriorityPathSet::new();
        set.add("a", Priority::High);
        set.add("b", Priority::High);
        assert_eq!(set.tier(Priority::High), &[PathBuf::from("a"), PathBuf::from("b")]);
        assert!(set.tier(Priority::Low).is_empty());
    }

    #[test]
    fn test_single() {
        let set = PriorityPathSet::single(Priority::Normal, ["x", "y", "x"]);
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|(p, _)| p == Priority::Normal));
    }

    #[test]
    fn test_from_settings() {
        let settings = vec![
            PathSetting {
                path: PathBuf::from("vendor"),
                priority: Priority::Lowest,
            },
            PathSetting {
                path: PathBuf::from("app"),
                priority: Priority::Highest,
            },
        ];
        let set = PriorityPathSet::from_settings(&settings);
        let first = set.iter().next().unwrap();
        assert_eq!(first, (Priority::Highest, Path::new("app")));
    }

    #[test]
    fn test_clear() {
        let mut set = PriorityPathSet::single(Priority::Low, ["a"]);
        set.clear();
        assert!(set.is_empty());
    }
}
