//! Report structures produced for each analyzed resume

use crate::llm::extractor::ExtractionResult;
use crate::processing::role_matcher::RoleMatch;
use crate::processing::skill_gap::SkillGapReport;
use crate::processing::text_processor::ResumeProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One uploaded file, identified by its name plus a short random suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: String,
    pub file_name: String,
    pub path: PathBuf,
}

impl UploadedDocument {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let suffix = uuid::Uuid::new_v4().simple().to_string();

        Self {
            id: format!("{}#{}", file_name, &suffix[..8]),
            file_name,
            path: path.to_path_buf(),
        }
    }

    /// File name without its extension, used for derived output names.
    pub fn stem(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file_name.clone())
    }
}

/// Everything the pipeline learned about one resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub document: UploadedDocument,
    /// Regex and keyword extraction.
    pub profile: ResumeProfile,
    /// Language-model extraction.
    pub extraction: ExtractionResult,
    pub matched_roles: Vec<RoleMatch>,
    pub skill_gap: SkillGapReport,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: SystemTime,
    pub mentor_version: String,
    pub processing_time_ms: u64,
    pub llm_model: String,
    pub extraction_backend: String,
}

impl ReportMetadata {
    pub fn new(processing_time_ms: u64, llm_model: &str, extraction_backend: &str) -> Self {
        Self {
            generated_at: SystemTime::now(),
            mentor_version: env!("CARGO_PKG_VERSION").to_string(),
            processing_time_ms,
            llm_model: llm_model.to_string(),
            extraction_backend: extraction_backend.to_string(),
        }
    }
}

impl DocumentReport {
    pub fn title(&self) -> String {
        format!("Smart Career Mentor Report: {}", self.document.file_name)
    }

    /// Candidate name, preferring the model's answer over the local heuristic.
    pub fn candidate_name(&self) -> Option<&str> {
        self.extraction.name.as_deref().or_else(|| self.profile.name())
    }

    pub fn matched_role_names(&self) -> Vec<&str> {
        self.matched_roles.iter().map(|m| m.role.as_str()).collect()
    }

    /// The `parsed_resume` artifact: identity, contact details and extracted skills.
    pub fn parsed_resume_json(&self) -> serde_json::Value {
        serde_json::json!({
            "file_name": self.document.file_name,
            "name": self.candidate_name(),
            "email": self.profile.email(),
            "phone": self.profile.phone(),
            "skills": self.skill_gap.resume_skills,
            "suggested_role": self.extraction.suggested_role,
            "matched_roles": self.matched_role_names(),
        })
    }

    /// The `skill_gap_output` artifact.
    pub fn skill_gap_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.skill_gap).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Completed { report: Box<DocumentReport> },
    Failed { document: UploadedDocument, error: String },
}

impl DocumentOutcome {
    pub fn document(&self) -> &UploadedDocument {
        match self {
            DocumentOutcome::Completed { report } => &report.document,
            DocumentOutcome::Failed { document, .. } => document,
        }
    }

    pub fn report(&self) -> Option<&DocumentReport> {
        match self {
            DocumentOutcome::Completed { report } => Some(report),
            DocumentOutcome::Failed { .. } => None,
        }
    }
}

/// Results of one run, in upload order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    pub fn push(&mut self, outcome: DocumentOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn reports(&self) -> impl Iterator<Item = &DocumentReport> {
        self.outcomes.iter().filter_map(DocumentOutcome::report)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&UploadedDocument, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            DocumentOutcome::Failed { document, error } => Some((document, error.as_str())),
            DocumentOutcome::Completed { .. } => None,
        })
    }

    pub fn get(&self, document_id: &str) -> Option<&DocumentOutcome> {
        self.outcomes.iter().find(|o| o.document().id == document_id)
    }

    pub fn completed_count(&self) -> usize {
        self.reports().count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.completed_count()
    }
}
