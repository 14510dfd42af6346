//! Per-document analysis pipeline: extract, profile, match roles, compute the skill gap

use crate::config::Config;
use crate::error::Result;
use crate::input::text_extractor::DocumentExtractor;
use crate::input::InputManager;
use crate::llm::client::ChatClient;
use crate::llm::extractor::{ExtractionResult, SkillRoleExtractor, ROLE_NOT_IDENTIFIED};
use crate::llm::recommender::SkillGapRecommender;
use crate::output::report::{BatchReport, DocumentOutcome, DocumentReport, ReportMetadata, UploadedDocument};
use crate::processing::role_matcher::{match_roles_detailed, RoleMatch};
use crate::processing::skill_gap::SkillGapReport;
use crate::processing::skills::SkillSet;
use crate::processing::text_processor::TextProcessor;
use indicatif::ProgressBar;
use log::{error, info, warn};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Overrides the matched and suggested roles.
    pub target_role: Option<String>,
    pub include_recommendations: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            target_role: None,
            include_recommendations: true,
        }
    }
}

/// Role to compute the gap against: explicit override, then the first
/// catalog match, then the model's suggestion.
pub fn choose_target_role(
    override_role: Option<&str>,
    matched_roles: &[RoleMatch],
    extraction: &ExtractionResult,
) -> Option<String> {
    if let Some(role) = override_role.map(str::trim).filter(|r| !r.is_empty()) {
        return Some(role.to_string());
    }
    if let Some(first) = matched_roles.first() {
        return Some(first.role.clone());
    }
    extraction.has_role().then(|| extraction.suggested_role.clone())
}

pub struct CareerAnalyzer<'a, E: DocumentExtractor, C: ChatClient> {
    input: InputManager<'a, E>,
    client: &'a C,
    config: &'a Config,
    text_processor: TextProcessor,
    extraction_backend: String,
}

impl<'a, E: DocumentExtractor, C: ChatClient> CareerAnalyzer<'a, E, C> {
    pub fn new(backend: &'a E, client: &'a C, config: &'a Config) -> Result<Self> {
        Ok(Self {
            input: InputManager::new(backend),
            client,
            config,
            text_processor: TextProcessor::new()?,
            extraction_backend: backend.backend_name().to_string(),
        })
    }

    /// Run the full pipeline for one document.
    pub async fn analyze_document(
        &mut self,
        document: &UploadedDocument,
        options: &AnalysisOptions,
    ) -> Result<DocumentReport> {
        let start_time = Instant::now();

        let text = self.input.extract_text(&document.path).await?;
        let profile = self.text_processor.parse_profile(&text);

        let extraction = SkillRoleExtractor::new(self.client, &self.config.llm)
            .extract(&text)
            .await?;
        if extraction.fallback {
            warn!("Model extraction unusable for {}; using local skills only", document.id);
        }

        let mut resume_skills: SkillSet = extraction.skill_set();
        resume_skills.extend_from(profile.skills());

        let matched_roles = match_roles_detailed(resume_skills.as_slice(), &self.config.catalog);
        info!(
            "{}: {} skills, matched roles {:?}",
            document.id,
            resume_skills.len(),
            matched_roles.iter().map(|m| m.role.as_str()).collect::<Vec<_>>()
        );

        let target_role = choose_target_role(options.target_role.as_deref(), &matched_roles, &extraction);
        let skill_gap = match target_role {
            Some(role) => self.assess_gap(resume_skills, role, options).await?,
            None => SkillGapReport::without_target(ROLE_NOT_IDENTIFIED, resume_skills, "no target role identified"),
        };

        let metadata = ReportMetadata::new(
            start_time.elapsed().as_millis() as u64,
            self.client.model_name(),
            &self.extraction_backend,
        );

        Ok(DocumentReport {
            document: document.clone(),
            profile,
            extraction,
            matched_roles,
            skill_gap,
            metadata,
        })
    }

    async fn assess_gap(
        &self,
        resume_skills: SkillSet,
        target_role: String,
        options: &AnalysisOptions,
    ) -> Result<SkillGapReport> {
        let recommender = SkillGapRecommender::new(self.client, &self.config.llm);

        let required = recommender.required_skills(&resume_skills, &target_role).await?;
        let report = SkillGapReport::new(target_role, resume_skills, required);

        if !options.include_recommendations {
            return Ok(report);
        }

        let recommendations = match report.gap.missing() {
            Some(missing) => Some(recommender.course_recommendations(missing, &report.target_role).await?),
            None => None,
        };

        Ok(match recommendations {
            Some(text) => report.with_recommendations(text),
            None => report,
        })
    }

    /// Process documents one after another.
    ///
    /// A failing document is recorded and the rest continue; only fatal
    /// errors abort the batch.
    pub async fn analyze_batch(
        &mut self,
        documents: &[UploadedDocument],
        options: &AnalysisOptions,
        progress: &ProgressBar,
    ) -> Result<BatchReport> {
        let mut batch = BatchReport::default();

        for document in documents {
            progress.set_message(document.file_name.clone());

            match self.analyze_document(document, options).await {
                Ok(report) => batch.push(DocumentOutcome::Completed { report: Box::new(report) }),
                Err(e) if e.is_fatal() => {
                    progress.abandon_with_message(format!("aborted at {}", document.file_name));
                    return Err(e);
                }
                Err(e) => {
                    error!("Failed to analyze {}: {}", document.id, e);
                    batch.push(DocumentOutcome::Failed {
                        document: document.clone(),
                        error: e.to_string(),
                    });
                }
            }

            progress.inc(1);
        }

        progress.finish_with_message("done");
        Ok(batch)
    }
}
