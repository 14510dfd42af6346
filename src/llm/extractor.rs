//! Language-model extraction of name, skills and suggested role

use crate::config::LlmSettings;
use crate::error::{CareerMentorError, Result};
use crate::llm::client::{ChatClient, ChatRequest};
use crate::llm::json_recovery::parse_object;
use crate::llm::prompts::{PromptTemplates, EXTRACTION_SYSTEM};
use crate::processing::skills::SkillSet;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub const ROLE_NOT_IDENTIFIED: &str = "Not identified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub name: Option<String>,
    pub skills: Vec<String>,
    pub suggested_role: String,
    /// Set when the model reply was unusable and the defaults were substituted.
    #[serde(default)]
    pub fallback: bool,
}

impl ExtractionResult {
    pub fn fallback() -> Self {
        Self {
            name: None,
            skills: Vec::new(),
            suggested_role: ROLE_NOT_IDENTIFIED.to_string(),
            fallback: true,
        }
    }

    pub fn has_role(&self) -> bool {
        !self.suggested_role.trim().is_empty() && self.suggested_role != ROLE_NOT_IDENTIFIED
    }

    pub fn skill_set(&self) -> SkillSet {
        self.skills.iter().map(String::as_str).collect()
    }
}

/// Shape of the model's JSON reply; every field is optional in practice.
#[derive(Debug, Deserialize)]
struct RawExtraction {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    skills: Option<RawSkills>,
    #[serde(default)]
    suggested_role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSkills {
    List(Vec<String>),
    Joined(String),
}

impl RawSkills {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            RawSkills::List(items) => items,
            RawSkills::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Turn a model reply into an [`ExtractionResult`].
pub fn parse_extraction(reply: &str) -> Result<ExtractionResult> {
    let raw: RawExtraction = parse_object(reply).ok_or_else(|| {
        CareerMentorError::ExtractionMalformed(format!(
            "expected a JSON object, got: {}",
            reply.chars().take(120).collect::<String>()
        ))
    })?;

    let suggested_role = raw
        .suggested_role
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| ROLE_NOT_IDENTIFIED.to_string());

    Ok(ExtractionResult {
        name: raw.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        skills: raw.skills.map(RawSkills::into_vec).unwrap_or_default(),
        suggested_role,
        fallback: false,
    })
}

pub struct SkillRoleExtractor<'a, C: ChatClient> {
    client: &'a C,
    settings: &'a LlmSettings,
    templates: PromptTemplates,
}

impl<'a, C: ChatClient> SkillRoleExtractor<'a, C> {
    pub fn new(client: &'a C, settings: &'a LlmSettings) -> Self {
        Self {
            client,
            settings,
            templates: PromptTemplates::default(),
        }
    }

    /// Ask the model for name, skills and role.
    ///
    /// An unparseable reply yields [`ExtractionResult::fallback`]; only
    /// service failures are returned as errors.
    pub async fn extract(&self, resume_text: &str) -> Result<ExtractionResult> {
        let resume_text = truncate_chars(resume_text, self.settings.max_resume_chars);
        let request = ChatRequest::new(
            EXTRACTION_SYSTEM,
            self.templates.render_extraction(resume_text),
            self.settings.extraction_temperature,
        )
        .with_max_tokens(self.settings.extraction_max_tokens);

        let reply = self.client.complete(&request).await?;

        match parse_extraction(&reply) {
            Ok(result) => {
                debug!(
                    "Extracted {} skills, suggested role '{}'",
                    result.skills.len(),
                    result.suggested_role
                );
                Ok(result)
            }
            Err(e) => {
                warn!("Falling back to empty extraction: {}", e);
                Ok(ExtractionResult::fallback())
            }
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedClient {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(reply: &str) -> Self {
            Self { reply: reply.to_string(), prompts: Mutex::new(Vec::new()) }
        }
    }

    impl ChatClient for ScriptedClient {
        async fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push(request.user_prompt().unwrap_or_default().to_string());
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    struct FailingClient;

    impl ChatClient for FailingClient {
        async fn complete(&self, _request: &ChatRequest) -> Result<String> {
            Err(CareerMentorError::ExternalService("quota exceeded".into()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_parse_well_formed_reply() {
        let reply = r#"{"name": "Jane Doe", "skills": ["Python", "SQL"], "suggested_role": "Data Analyst"}"#;
        let result = parse_extraction(reply).unwrap();

        assert_eq!(result.name.as_deref(), Some("Jane Doe"));
        assert_eq!(result.skills, vec!["Python", "SQL"]);
        assert!(result.has_role());
        assert!(!result.fallback);
    }

    #[test]
    fn test_parse_comma_joined_skills() {
        let reply = "```json\n{\"skills\": \"Docker, Kubernetes ,, Terraform\"}\n```";
        let result = parse_extraction(reply).unwrap();

        assert_eq!(result.skills, vec!["Docker", "Kubernetes", "Terraform"]);
        assert_eq!(result.suggested_role, ROLE_NOT_IDENTIFIED);
        assert!(!result.has_role());
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = parse_extraction("I could not find any skills.").unwrap_err();
        assert!(matches!(err, CareerMentorError::ExtractionMalformed(_)));
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let client = ScriptedClient::new("Sorry, here is the data: name=Jane, skills=python");
        let settings = LlmSettings::default();
        let extractor = SkillRoleExtractor::new(&client, &settings);

        let result = extractor.extract("Jane Doe\nPython").await.unwrap();

        assert_eq!(result, ExtractionResult::fallback());
        assert!(result.skills.is_empty());
        assert_eq!(result.suggested_role, "Not identified");
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let client = FailingClient;
        let settings = LlmSettings::default();
        let extractor = SkillRoleExtractor::new(&client, &settings);

        let err = extractor.extract("resume").await.unwrap_err();
        assert!(matches!(err, CareerMentorError::ExternalService(_)));
    }

    #[tokio::test]
    async fn test_resume_text_is_truncated() {
        let client = ScriptedClient::new("{}");
        let settings = LlmSettings { max_resume_chars: 10, ..LlmSettings::default() };
        let extractor = SkillRoleExtractor::new(&client, &settings);

        extractor.extract("0123456789ABCDEFGHIJ").await.unwrap();

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("0123456789"));
        assert!(!prompts[0].contains("ABCDEF"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
