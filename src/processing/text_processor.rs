//! Text cleanup and local entity extraction (contact details, name, keyword skills)

use crate::error::{CareerMentorError, Result};
use crate::processing::skills::SkillSet;
use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Keywords recognised without the language model.
pub const DEFAULT_SKILL_KEYWORDS: &[&str] = &[
    "python", "azure", "aws", "kubernetes", "terraform", "pandas", "sql", "docker", "streamlit",
];

/// Lines that look like names but are document headings.
const HEADING_WORDS: &[&str] = &[
    "resume", "curriculum vitae", "cv", "summary", "profile", "objective", "experience",
    "work experience", "education", "skills", "technical skills", "projects", "contact",
    "certifications", "references",
];

const NAME_SCAN_LINES: usize = 10;

/// Structured profile derived locally from resume text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    skills: SkillSet,
    raw_text: String,
}

impl ResumeProfile {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn skills(&self) -> &SkillSet {
        &self.skills
    }

    /// Whitespace-normalized resume text.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

pub struct TextProcessor {
    email_regex: Regex,
    phone_regex: Regex,
    whitespace_regex: Regex,
    skill_matcher: AhoCorasick,
    skill_keywords: Vec<String>,
}

impl TextProcessor {
    pub fn new() -> Result<Self> {
        Self::with_skill_keywords(DEFAULT_SKILL_KEYWORDS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_skill_keywords(skill_keywords: Vec<String>) -> Result<Self> {
        let email_regex = Regex::new(r"[\w.-]+@[\w.-]+")
            .expect("Invalid email regex");

        let phone_regex = Regex::new(r"(?:\+\d{1,3}[-. ]?)?(?:\(\d{3}\)|\b\d{3})[-. ]?\d{3}[-. ]?\d{4}\b")
            .expect("Invalid phone regex");

        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");

        let skill_matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&skill_keywords)
            .map_err(|e| CareerMentorError::Configuration(format!("Failed to build skill matcher: {}", e)))?;

        Ok(Self {
            email_regex,
            phone_regex,
            whitespace_regex,
            skill_matcher,
            skill_keywords,
        })
    }

    /// Collapse whitespace runs and fold typographic punctuation to ASCII.
    pub fn clean_text(&self, text: &str) -> String {
        let collapsed = self.whitespace_regex.replace_all(text, " ");
        normalize_unicode(collapsed.trim())
    }

    pub fn extract_email(&self, text: &str) -> Option<String> {
        self.email_regex.find(text).map(|m| m.as_str().to_string())
    }

    pub fn extract_phone(&self, text: &str) -> Option<String> {
        self.phone_regex.find(text).map(|m| m.as_str().trim().to_string())
    }

    /// First short line near the top made only of capitalized words.
    ///
    /// Expects the original line structure, so call it before [`clean_text`](Self::clean_text).
    pub fn extract_name(&self, text: &str) -> Option<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(NAME_SCAN_LINES)
            .find(|line| looks_like_name(line))
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Known keywords occurring anywhere in the text, in keyword-list order.
    pub fn extract_skills(&self, text: &str) -> SkillSet {
        let mut found = vec![false; self.skill_keywords.len()];
        for mat in self.skill_matcher.find_overlapping_iter(text) {
            found[mat.pattern().as_usize()] = true;
        }

        self.skill_keywords
            .iter()
            .zip(found)
            .filter(|(_, hit)| *hit)
            .map(|(keyword, _)| keyword.as_str())
            .collect()
    }

    /// Build the local profile for one document's text.
    pub fn parse_profile(&self, text: &str) -> ResumeProfile {
        let name = self.extract_name(text);
        let cleaned = self.clean_text(text);

        ResumeProfile {
            name,
            email: self.extract_email(&cleaned),
            phone: self.extract_phone(&cleaned),
            skills: self.extract_skills(&cleaned),
            raw_text: cleaned,
        }
    }
}

fn looks_like_name(line: &str) -> bool {
    if line.len() > 50 || line.contains('@') || line.contains(':') {
        return false;
    }
    if line.chars().any(|c| !(c.is_alphabetic() || c.is_whitespace() || matches!(c, '.' | '-' | '\''))) {
        return false;
    }
    let lower = line.to_lowercase();
    if HEADING_WORDS.contains(&lower.as_str()) {
        return false;
    }

    let words: Vec<&str> = line.unicode_words().collect();
    (2..=4).contains(&words.len())
        && words
            .iter()
            .all(|w| w.chars().next().map_or(false, char::is_uppercase))
}

/// Map typographic characters to their plain equivalents.
pub fn normalize_unicode(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' | '\u{25CF}' => '-',
            '\u{00A0}' => ' ',
            _ => c,
        })
        .collect()
}
