//! Required-skill suggestions and course recommendations for a target role

use crate::config::LlmSettings;
use crate::error::Result;
use crate::llm::client::{ChatClient, ChatRequest};
use crate::llm::json_recovery::parse_string_list;
use crate::llm::prompts::{PromptTemplates, COURSES_SYSTEM, REQUIRED_SKILLS_SYSTEM};
use crate::processing::skills::SkillSet;
use log::{info, warn};

pub const ALL_SKILLS_PRESENT: &str = "You already have all key skills needed!";

pub struct SkillGapRecommender<'a, C: ChatClient> {
    client: &'a C,
    settings: &'a LlmSettings,
    templates: PromptTemplates,
}

impl<'a, C: ChatClient> SkillGapRecommender<'a, C> {
    pub fn new(client: &'a C, settings: &'a LlmSettings) -> Self {
        Self {
            client,
            settings,
            templates: PromptTemplates::default(),
        }
    }

    /// Skills the model considers necessary for `role`.
    ///
    /// A reply that is not a JSON array of strings gives an empty set, which
    /// callers must treat as "gap not computable".
    pub async fn required_skills(&self, resume_skills: &SkillSet, role: &str) -> Result<SkillSet> {
        let request = ChatRequest::new(
            REQUIRED_SKILLS_SYSTEM,
            self.templates.render_required_skills(resume_skills, role),
            self.settings.recommendation_temperature,
        );

        let reply = self.client.complete(&request).await?;
        let skills = parse_string_list(&reply);
        if skills.is_empty() {
            warn!("Invalid required-skill list for '{}': {}", role, reply.chars().take(120).collect::<String>());
        } else {
            info!("{} required skills suggested for '{}'", skills.len(), role);
        }

        Ok(SkillSet::from(skills))
    }

    /// Markdown learning plan for the missing skills.
    ///
    /// No request is made when nothing is missing.
    pub async fn course_recommendations(&self, missing_skills: &SkillSet, role: &str) -> Result<String> {
        if missing_skills.is_empty() {
            return Ok(ALL_SKILLS_PRESENT.to_string());
        }

        let request = ChatRequest::new(
            COURSES_SYSTEM,
            self.templates.render_course_recommendations(missing_skills, role),
            self.settings.recommendation_temperature,
        );

        self.client.complete(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClient {
        reply: &'static str,
        calls: AtomicUsize,
    }

    impl ChatClient for CountingClient {
        async fn complete(&self, _request: &ChatRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_required_skills_parsed_from_json_array() {
        let client = CountingClient {
            reply: r#"Here: ["CI/CD", "Docker", "Kubernetes", "docker"]"#,
            calls: AtomicUsize::new(0),
        };
        let settings = LlmSettings::default();
        let recommender = SkillGapRecommender::new(&client, &settings);

        let skills = recommender.required_skills(&SkillSet::new(), "DevOps Engineer").await.unwrap();

        assert_eq!(skills.join(", "), "CI/CD, Docker, Kubernetes");
    }

    #[tokio::test]
    async fn test_unparseable_required_skills_are_empty() {
        let client = CountingClient {
            reply: "['Solution Design', 'Monitoring']",
            calls: AtomicUsize::new(0),
        };
        let settings = LlmSettings::default();
        let recommender = SkillGapRecommender::new(&client, &settings);

        let skills = recommender.required_skills(&SkillSet::new(), "Cloud Architect").await.unwrap();

        assert!(skills.is_empty());
    }

    #[tokio::test]
    async fn test_no_course_request_without_gap() {
        let client = CountingClient { reply: "courses", calls: AtomicUsize::new(0) };
        let settings = LlmSettings::default();
        let recommender = SkillGapRecommender::new(&client, &settings);

        let text = recommender.course_recommendations(&SkillSet::new(), "Data Analyst").await.unwrap();

        assert_eq!(text, ALL_SKILLS_PRESENT);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_course_request_for_missing_skills() {
        let client = CountingClient { reply: "- Kubernetes: Microsoft Learn", calls: AtomicUsize::new(0) };
        let settings = LlmSettings::default();
        let recommender = SkillGapRecommender::new(&client, &settings);
        let missing: SkillSet = ["Kubernetes"].into_iter().collect();

        let text = recommender.course_recommendations(&missing, "DevOps Engineer").await.unwrap();

        assert!(text.contains("Microsoft Learn"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }
}
