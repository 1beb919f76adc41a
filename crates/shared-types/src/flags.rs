use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flag name → value for one dataset.
///
/// Seeded with every flag the registry knows about (all `false`), so a
/// consumer reading an unchecked issue sees an explicit `false` rather than
/// a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet(BTreeMap<String, bool>);

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `names` present and false.
    pub fn seeded<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(|n| (n.into(), false)).collect())
    }

    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.0.insert(name.into(), value);
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Names of true flags in sorted order.
    pub fn true_flags(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|(_, v)| **v).map(|(k, _)| k.as_str())
    }

    pub fn true_count(&self) -> usize {
        self.0.values().filter(|v| **v).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for FlagSet {
    fn from_iter<T: IntoIterator<Item = (S, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A surviving flag with the number of interrogatories it contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagCount {
    pub flag: String,
    pub count: u32,
}

impl FlagCount {
    pub fn new(flag: impl Into<String>, count: u32) -> Self {
        Self {
            flag: flag.into(),
            count,
        }
    }
}

/// Sum of counts over a slice of flags.
pub fn total_count(flags: &[FlagCount]) -> u32 {
    flags.iter().map(|f| f.count).sum()
}
