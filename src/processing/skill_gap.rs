//! Skill gap between a resume and a target role

use crate::processing::skills::SkillSet;
use serde::{Deserialize, Serialize};

/// Required skills absent from the resume, compared case-insensitively.
///
/// Output keeps the order and spelling of `required`.
pub fn missing_skills(required: &SkillSet, resume: &SkillSet) -> SkillSet {
    required
        .iter()
        .filter(|skill| !resume.contains(skill))
        .map(String::as_str)
        .collect()
}

/// Outcome of the gap computation.
///
/// `NotComputable` means no required-skill list was available; it must never
/// be rendered as "no gap".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GapAssessment {
    Computed { missing_skills: SkillSet },
    NotComputable { reason: String },
}

impl GapAssessment {
    pub fn assess(required: &SkillSet, resume: &SkillSet) -> Self {
        if required.is_empty() {
            return GapAssessment::NotComputable {
                reason: "no required skills could be determined for the target role".to_string(),
            };
        }
        GapAssessment::Computed {
            missing_skills: missing_skills(required, resume),
        }
    }

    pub fn not_computable(reason: impl Into<String>) -> Self {
        GapAssessment::NotComputable { reason: reason.into() }
    }

    pub fn is_computable(&self) -> bool {
        matches!(self, GapAssessment::Computed { .. })
    }

    /// Missing skills, or `None` when the gap could not be computed.
    pub fn missing(&self) -> Option<&SkillSet> {
        match self {
            GapAssessment::Computed { missing_skills } => Some(missing_skills),
            GapAssessment::NotComputable { .. } => None,
        }
    }

    /// One-line summary used by every renderer.
    pub fn describe(&self) -> String {
        match self {
            GapAssessment::Computed { missing_skills } if missing_skills.is_empty() => {
                "None - all required skills are present".to_string()
            }
            GapAssessment::Computed { missing_skills } => missing_skills.join(", "),
            GapAssessment::NotComputable { reason } => format!("Not computable ({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGapReport {
    pub target_role: String,
    pub resume_skills: SkillSet,
    pub required_skills: SkillSet,
    pub gap: GapAssessment,
    /// Markdown text; `None` when recommendations were skipped or not computable.
    pub course_recommendations: Option<String>,
}

impl SkillGapReport {
    pub fn new(target_role: impl Into<String>, resume_skills: SkillSet, required_skills: SkillSet) -> Self {
        let gap = GapAssessment::assess(&required_skills, &resume_skills);
        Self {
            target_role: target_role.into(),
            resume_skills,
            required_skills,
            gap,
            course_recommendations: None,
        }
    }

    /// Report for a document where no target role could be settled on.
    pub fn without_target(target_role: impl Into<String>, resume_skills: SkillSet, reason: &str) -> Self {
        Self {
            target_role: target_role.into(),
            resume_skills,
            required_skills: SkillSet::new(),
            gap: GapAssessment::not_computable(reason),
            course_recommendations: None,
        }
    }

    pub fn with_recommendations(mut self, recommendations: String) -> Self {
        self.course_recommendations = Some(recommendations);
        self
    }
}
