//! CLI interface for the career mentor

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Extensions accepted for upload.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "md"];

#[derive(Parser)]
#[command(name = "career-mentor")]
#[command(about = "AI-powered resume analysis, role matching and skill-gap mentoring")]
#[command(long_about = "Extract skills from resumes, match them to job roles, compute the skill gap for a target role and recommend courses, using Azure Document Intelligence and Azure OpenAI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more resumes
    Analyze {
        /// Resume files (PDF, DOCX, TXT, MD)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Target role for the skill gap instead of the matched or suggested role
        #[arg(short, long)]
        role: Option<String>,

        /// Output format: console, json, markdown, html, pdf
        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,

        /// Directory to write rendered reports into
        #[arg(short, long)]
        save_dir: Option<PathBuf>,

        /// Also write parsed_resume and skill_gap_output JSON files
        #[arg(long, requires = "save_dir")]
        save_json: bool,

        /// Read PDFs locally instead of calling the document analysis service
        #[arg(long)]
        local_extract: bool,

        /// Skip course recommendations
        #[arg(long)]
        no_recommendations: bool,
    },

    /// List catalog roles, or match a skill list against them
    Roles {
        /// Comma-separated skills to match offline
        #[arg(short, long, value_delimiter = ',')]
        skills: Option<Vec<String>>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        "pdf" => Ok(OutputFormat::Pdf),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown, html, pdf", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err(format!("File has no extension: {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::try_parse_from([
            "career-mentor", "analyze", "a.pdf", "b.docx", "--role", "Data Analyst", "-o", "md", "--save-dir", "out",
            "--save-json",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze { files, role, output, save_json, local_extract, .. } => {
                assert_eq!(files.len(), 2);
                assert_eq!(role.as_deref(), Some("Data Analyst"));
                assert_eq!(output, Some(OutputFormat::Markdown));
                assert!(save_json);
                assert!(!local_extract);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_save_json_needs_save_dir() {
        assert!(Cli::try_parse_from(["career-mentor", "analyze", "a.pdf", "--save-json"]).is_err());
    }

    #[test]
    fn test_roles_skill_list() {
        let cli = Cli::try_parse_from(["career-mentor", "roles", "--skills", "python,sql,excel"]).unwrap();
        match cli.command {
            Commands::Roles { skills } => assert_eq!(skills.unwrap(), vec!["python", "sql", "excel"]),
            _ => panic!("expected roles"),
        }
    }

    #[test]
    fn test_extension_validation() {
        assert!(validate_file_extension(Path::new("cv.PDF"), SUPPORTED_EXTENSIONS).is_ok());
        assert!(validate_file_extension(Path::new("cv.odt"), SUPPORTED_EXTENSIONS).is_err());
        assert!(validate_file_extension(Path::new("cv"), SUPPORTED_EXTENSIONS).is_err());
        assert!(parse_output_format("PDF").is_ok());
        assert!(parse_output_format("docx").is_err());
    }
}
