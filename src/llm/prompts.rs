//! Prompt templates for skill extraction, required skills and course recommendations

use crate::processing::skills::SkillSet;

pub const EXTRACTION_SYSTEM: &str = "You are a helpful AI assistant.";
pub const REQUIRED_SKILLS_SYSTEM: &str = "You are a helpful AI career advisor.";
pub const COURSES_SYSTEM: &str = "You are a career mentor and course recommender.";

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub extraction: String,
    pub required_skills: String,
    pub course_recommendations: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            extraction: EXTRACTION_TEMPLATE.to_string(),
            required_skills: REQUIRED_SKILLS_TEMPLATE.to_string(),
            course_recommendations: COURSES_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn render_extraction(&self, resume_text: &str) -> String {
        self.extraction.replace("{resume}", resume_text)
    }

    pub fn render_required_skills(&self, resume_skills: &SkillSet, role: &str) -> String {
        self.required_skills
            .replace("{skills}", &quoted_list(resume_skills))
            .replace("{role}", role)
    }

    pub fn render_course_recommendations(&self, missing_skills: &SkillSet, role: &str) -> String {
        self.course_recommendations
            .replace("{missing}", &quoted_list(missing_skills))
            .replace("{role}", role)
    }
}

/// JSON-style rendering so the model sees exact skill spellings.
fn quoted_list(skills: &SkillSet) -> String {
    serde_json::to_string(skills.as_slice()).unwrap_or_else(|_| skills.join(", "))
}

const EXTRACTION_TEMPLATE: &str = r#"You are an intelligent AI resume parser and expert career assistant.
Based on the following resume text, extract:
- Full name (if available)
- Key technical or professional skills
- A recommended job role

Please return ONLY a JSON object with this structure:

{
  "name": "<full_name>",
  "skills": ["skill1", "skill2", "skill3"],
  "suggested_role": "<best_matched_role>"
}

Resume Text:
"""
{resume}
""""#;

const REQUIRED_SKILLS_TEMPLATE: &str = r#"You are an AI career mentor. A candidate has resume skills: {skills} and wants to become a {role}.
Your goal is to identify the most relevant technical and soft skills they should know for this role.

Guidelines:
1. Recommend 6-10 balanced and practical skills (not just vendor-specific ones).
2. Skills should include general architecture, DevOps, security, cloud principles, and platform-specific ones where needed.
3. Expand abbreviations (e.g., IaC -> Infrastructure as Code), but avoid redundancy if both are present.
4. If an abbreviation is already in the candidate's skills, don't re-suggest its expanded form.
5. Do not overfit to a single cloud; suggest transferable skills too (e.g., CI/CD, Networking).
6. Return ONLY a JSON array of strings.

Return output like:
["Solution Design", "Infrastructure as Code", "CI/CD", "Monitoring", "Cost Optimization"]"#;

const COURSES_TEMPLATE: &str = r#"Act as a personalized AI career coach and course recommender.

A user is targeting the role: {role}.
They are missing these skills: {missing}

Task:
For each missing skill, recommend:
1. 4-5 beginner-level online courses from platforms such as Microsoft Learn, LinkedIn Learning, Coursera, edX, YouTube or Udemy.
2. 3-4 trusted learning websites for self-paced tutorials such as Microsoft Learn, Medium or vendor community sites.

Rules:
- Match the learning platform and content to the domain (Azure, AWS, Data Science, GCP, DevOps, ...).
- Avoid platform mismatch (e.g., AWS content for an Azure role).
- Provide URLs if possible.
- Expand abbreviations (e.g., IaC -> Infrastructure as Code), but avoid duplicates.

Output in readable markdown format."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_embeds_resume() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_extraction("Jane Doe, Python developer");

        assert!(prompt.contains("Jane Doe, Python developer"));
        assert!(prompt.contains("\"suggested_role\""));
        assert!(!prompt.contains("{resume}"));
    }

    #[test]
    fn test_required_skills_prompt() {
        let templates = PromptTemplates::default();
        let skills: SkillSet = ["Azure", "IaC"].into_iter().collect();
        let prompt = templates.render_required_skills(&skills, "Cloud Architect");

        assert!(prompt.contains(r#"["Azure","IaC"]"#));
        assert!(prompt.contains("wants to become a Cloud Architect"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_course_prompt() {
        let templates = PromptTemplates::default();
        let missing: SkillSet = ["Kubernetes"].into_iter().collect();
        let prompt = templates.render_course_recommendations(&missing, "DevOps Engineer");

        assert!(prompt.contains("targeting the role: DevOps Engineer"));
        assert!(prompt.contains(r#"["Kubernetes"]"#));
    }
}
