//! Keyword-overlap matching of extracted skills against the role catalog

use crate::processing::skills::{skill_key, SkillSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of shared skills a role needs before it is considered a match.
pub const MIN_SKILL_OVERLAP: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: String,
    pub skills: Vec<String>,
}

/// Role name to required skills, in declaration order.
///
/// A role declaring fewer than [`MIN_SKILL_OVERLAP`] distinct skills can never
/// be matched; see [`RoleCatalog::unmatchable_roles`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCatalog {
    pub roles: Vec<RoleDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMatch {
    pub role: String,
    /// Shared skills, spelled as the catalog spells them.
    pub overlapping_skills: Vec<String>,
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::from_pairs(&[
            ("Data Analyst", &["SQL", "Excel", "Python", "Tableau"]),
            ("ML Engineer", &["Python", "Pandas", "Scikit-learn", "ML"]),
            ("Cloud Architect", &["Azure", "VM", "Networking", "Security"]),
            ("DevOps Engineer", &["CI/CD", "Docker", "Kubernetes", "Terraform"]),
            ("Data Engineer", &["Spark", "Hadoop", "Python", "ETL"]),
        ])
    }
}

impl RoleCatalog {
    pub fn new(roles: Vec<RoleDefinition>) -> Self {
        Self { roles }
    }

    pub fn from_pairs(pairs: &[(&str, &[&str])]) -> Self {
        Self {
            roles: pairs
                .iter()
                .map(|(name, skills)| RoleDefinition {
                    name: name.to_string(),
                    skills: skills.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoleDefinition> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Look up a role by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&RoleDefinition> {
        let wanted = skill_key(name);
        self.roles.iter().find(|r| skill_key(&r.name) == wanted)
    }

    /// Roles with too few distinct skills to ever reach the overlap threshold.
    pub fn unmatchable_roles(&self) -> Vec<&str> {
        self.roles
            .iter()
            .filter(|r| SkillSet::from(r.skills.clone()).len() < MIN_SKILL_OVERLAP)
            .map(|r| r.name.as_str())
            .collect()
    }
}

/// Names of every catalog role sharing at least two skills with `skills`.
///
/// Comparison is exact after lower-casing; order follows the catalog.
pub fn match_roles<S: AsRef<str>>(skills: &[S], catalog: &RoleCatalog) -> Vec<String> {
    match_roles_detailed(skills, catalog)
        .into_iter()
        .map(|m| m.role)
        .collect()
}

/// Same selection as [`match_roles`], with the shared skills of each role.
pub fn match_roles_detailed<S: AsRef<str>>(skills: &[S], catalog: &RoleCatalog) -> Vec<RoleMatch> {
    let extracted: HashSet<String> = skills
        .iter()
        .map(|s| skill_key(s.as_ref()))
        .filter(|k| !k.is_empty())
        .collect();

    if extracted.is_empty() {
        return Vec::new();
    }

    catalog
        .iter()
        .filter_map(|role| {
            let required = SkillSet::from(role.skills.clone());
            let overlapping_skills: Vec<String> = required
                .iter()
                .filter(|skill| extracted.contains(&skill_key(skill)))
                .cloned()
                .collect();

            (overlapping_skills.len() >= MIN_SKILL_OVERLAP).then(|| RoleMatch {
                role: role.name.clone(),
                overlapping_skills,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyst_catalog() -> RoleCatalog {
        RoleCatalog::from_pairs(&[("Data Analyst", &["SQL", "Excel", "Python", "Tableau"])])
    }

    #[test]
    fn test_three_way_overlap_matches() {
        let roles = match_roles(&["python", "sql", "excel"], &analyst_catalog());
        assert_eq!(roles, vec!["Data Analyst".to_string()]);
    }

    #[test]
    fn test_single_overlap_does_not_match() {
        let roles = match_roles(&["python"], &analyst_catalog());
        assert!(roles.is_empty());
    }

    #[test]
    fn test_empty_skills_never_match() {
        let skills: Vec<String> = Vec::new();
        assert!(match_roles(&skills, &RoleCatalog::default()).is_empty());
    }

    #[test]
    fn test_matching_ignores_case() {
        let catalog = RoleCatalog::default();
        assert_eq!(
            match_roles(&["PYTHON", "SQL"], &catalog),
            match_roles(&["python", "sql"], &catalog)
        );
    }

    #[test]
    fn test_duplicates_do_not_inflate_overlap() {
        let roles = match_roles(&["Python", "python", "PYTHON"], &analyst_catalog());
        assert!(roles.is_empty());
    }

    #[test]
    fn test_all_matches_returned_in_catalog_order() {
        // Python + Pandas hits ML Engineer, Python + Spark hits Data Engineer,
        // Python + SQL hits Data Analyst; declaration order wins over overlap size.
        let skills = ["spark", "Pandas", "Python", "SQL", "ETL", "Hadoop"];
        let roles = match_roles(&skills, &RoleCatalog::default());
        assert_eq!(roles, vec!["Data Analyst", "ML Engineer", "Data Engineer"]);
    }

    #[test]
    fn test_detailed_match_reports_catalog_spelling() {
        let matches = match_roles_detailed(&["docker", "ci/cd"], &RoleCatalog::default());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].role, "DevOps Engineer");
        assert_eq!(matches[0].overlapping_skills, vec!["CI/CD", "Docker"]);
    }

    #[test]
    fn test_short_roles_are_unmatchable() {
        let catalog = RoleCatalog::from_pairs(&[
            ("Solo", &["Rust"]),
            ("Echo", &["Go", "go"]),
            ("Pair", &["Rust", "Go"]),
        ]);

        assert_eq!(catalog.unmatchable_roles(), vec!["Solo", "Echo"]);
        assert!(match_roles(&["rust", "go"], &catalog) == vec!["Pair".to_string()]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = RoleCatalog::default();
        assert_eq!(catalog.get("devops engineer").map(|r| r.name.as_str()), Some("DevOps Engineer"));
        assert!(catalog.get("Astronaut").is_none());
    }
}
