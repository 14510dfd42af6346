//! Recovering JSON values from free-form model output
//!
//! Model replies often wrap the requested JSON in prose or markdown fences.
//! The helpers here locate the first balanced object or array and hand it to
//! `serde_json`; nothing is ever evaluated.

use serde::de::DeserializeOwned;

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// First balanced region opened by `open` and closed by `close`.
///
/// Brackets inside JSON string literals (including escaped quotes) are not
/// counted. Returns `None` if no region closes.
pub fn first_balanced_region(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                let end = start + offset + c.len_utf8();
                return Some(&text[start..end]);
            }
        }
    }

    None
}

/// Parse the first JSON object in `text` as `T`.
pub fn parse_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    let body = strip_json_fences(text);
    let region = first_balanced_region(body, '{', '}')?;
    serde_json::from_str(region).ok()
}

/// Parse the first JSON array of strings in `text`; empty on any failure.
pub fn parse_string_list(text: &str) -> Vec<String> {
    let body = strip_json_fences(text);
    first_balanced_region(body, '[', ']')
        .and_then(|region| serde_json::from_str::<Vec<String>>(region).ok())
        .map(|items| {
            items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_region_ignores_brackets_in_strings() {
        let text = r#"Here you go: {"note": "use } carefully \" {", "n": {"x": 1}} trailing }"#;
        assert_eq!(
            first_balanced_region(text, '{', '}'),
            Some(r#"{"note": "use } carefully \" {", "n": {"x": 1}}"#)
        );
    }

    #[test]
    fn test_unclosed_region() {
        assert!(first_balanced_region("[\"a\", \"b\"", '[', ']').is_none());
        assert!(first_balanced_region("no brackets", '[', ']').is_none());
    }

    #[test]
    fn test_string_list_inside_prose() {
        let reply = "Sure! The skills are:\n```json\n[\"CI/CD\", \" Monitoring \", \"\"]\n```";
        assert_eq!(parse_string_list(reply), vec!["CI/CD", "Monitoring"]);
    }

    #[test]
    fn test_python_style_list_is_rejected() {
        assert!(parse_string_list("['Solution Design', 'CI/CD']").is_empty());
        assert!(parse_string_list("__import__('os').system('rm -rf /')").is_empty());
    }

    #[test]
    fn test_parse_object() {
        #[derive(Deserialize)]
        struct Reply {
            role: String,
        }

        let reply: Option<Reply> = parse_object("Result -> {\"role\": \"ML Engineer\"} done");
        assert_eq!(reply.map(|r| r.role).as_deref(), Some("ML Engineer"));
        assert!(parse_object::<Reply>("{\"role\": 42}").is_none());
    }
}
