//! Case-insensitive skill collections

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Normalized comparison key for a skill: trimmed and lower-cased.
pub fn skill_key(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Ordered set of skills, deduplicated case-insensitively.
///
/// The first spelling inserted for a skill is the one kept, so `"Docker"`
/// followed by `"docker"` stores `"Docker"` once. Blank entries are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SkillSet {
    skills: Vec<String>,
    keys: HashSet<String>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a skill, returning `false` when an equivalent one is already present.
    pub fn insert(&mut self, skill: &str) -> bool {
        let key = skill_key(skill);
        if key.is_empty() || self.keys.contains(&key) {
            return false;
        }
        self.keys.insert(key);
        self.skills.push(skill.trim().to_string());
        true
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.keys.contains(&skill_key(skill))
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.skills.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.skills
    }

    /// Lower-cased keys, used for set arithmetic.
    pub fn keys(&self) -> &HashSet<String> {
        &self.keys
    }

    /// Merge another set into this one; entries already present keep their casing.
    pub fn extend_from(&mut self, other: &SkillSet) {
        for skill in other.iter() {
            self.insert(skill);
        }
    }

    /// Skills joined for display, e.g. `"Python, SQL"`.
    pub fn join(&self, separator: &str) -> String {
        self.skills.join(separator)
    }
}

impl From<Vec<String>> for SkillSet {
    fn from(skills: Vec<String>) -> Self {
        skills.iter().map(String::as_str).collect()
    }
}

impl From<SkillSet> for Vec<String> {
    fn from(set: SkillSet) -> Self {
        set.skills
    }
}

impl<'a> FromIterator<&'a str> for SkillSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for skill in iter {
            set.insert(skill);
        }
        set
    }
}

impl FromIterator<String> for SkillSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for skill in iter {
            set.insert(&skill);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.skills.iter()
    }
}
