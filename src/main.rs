//! Career mentor: resume analysis, role matching and skill-gap recommendations

use anyhow::{bail, Context};
use career_mentor::cli::{self, Cli, Commands, ConfigAction, SUPPORTED_EXTENSIONS};
use career_mentor::config::{Config, OutputFormat, ServiceCredentials};
use career_mentor::input::file_detector::FileType;
use career_mentor::input::text_extractor::{AzureDocumentExtractor, ExtractorBackend, LocalPdfExtractor};
use career_mentor::llm::client::AzureChatClient;
use career_mentor::output::report::UploadedDocument;
use career_mentor::output::{ReportGenerator, ReportWriter};
use career_mentor::processing::analyzer::{AnalysisOptions, CareerAnalyzer};
use career_mentor::processing::role_matcher::match_roles_detailed;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::process;

struct AnalyzeArgs {
    files: Vec<PathBuf>,
    role: Option<String>,
    output: Option<OutputFormat>,
    save_dir: Option<PathBuf>,
    save_json: bool,
    local_extract: bool,
    no_recommendations: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli).await {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    match cli.command {
        Commands::Analyze {
            files,
            role,
            output,
            save_dir,
            save_json,
            local_extract,
            no_recommendations,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let args = AnalyzeArgs {
                files,
                role,
                output,
                save_dir,
                save_json,
                local_extract,
                no_recommendations,
            };
            analyze(args, &config).await
        }

        Commands::Roles { skills } => {
            let config = load_config(cli.config.as_deref())?;
            show_roles(&config, skills.as_deref());
            Ok(())
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let config = load_config(cli.config.as_deref())?;
                println!("⚙️  Current Configuration ({})\n", config_path.display());
                println!("{}", toml::to_string_pretty(&config).context("Failed to render configuration")?);
                Ok(())
            }
            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
                Ok(())
            }
            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default()
                    .save_to(&config_path)
                    .with_context(|| format!("Failed to write {}", config_path.display()))?;
                println!("✅ Configuration reset successfully!");
                Ok(())
            }
        },
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => {
            Config::load_from(path).with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::load().context("Failed to load configuration")?,
    };

    for role in config.catalog.unmatchable_roles() {
        warn!("Role '{}' lists fewer than two distinct skills and can never be matched", role);
    }

    Ok(config)
}

async fn analyze(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    for file in &args.files {
        if let Err(e) = cli::validate_file_extension(file, SUPPORTED_EXTENSIONS) {
            bail!("{}: {}", file.display(), e);
        }
    }

    let needs_document_service = !args.local_extract
        && args.files.iter().any(|f| FileType::from_path(f).needs_document_service());

    // Every credential is checked before the first request goes out.
    let credentials = ServiceCredentials::from_env(needs_document_service)?;

    let backend = match &credentials.document {
        Some(document) => ExtractorBackend::Azure(AzureDocumentExtractor::new(document, &config.extraction)?),
        None => ExtractorBackend::Local(LocalPdfExtractor),
    };
    let client = AzureChatClient::new(&credentials.openai, &config.llm)?;

    let format = args.output.unwrap_or(config.output.format);
    let save_dir = args.save_dir.clone().or_else(|| config.output.output_dir.clone());
    let options = AnalysisOptions {
        target_role: args.role.clone(),
        include_recommendations: !args.no_recommendations,
    };

    println!("🚀 Smart career mentor analysis");
    println!("📄 Resumes: {}", args.files.len());
    println!("🔧 Output Format: {:?}", format);
    if let Some(role) = &options.target_role {
        println!("🎯 Target Role: {}", role);
    }
    if args.local_extract {
        println!("📂 Local PDF extraction enabled");
    }

    let documents: Vec<UploadedDocument> = args.files.iter().map(|f| UploadedDocument::from_path(f)).collect();

    let progress = ProgressBar::new(documents.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut analyzer = CareerAnalyzer::new(&backend, &client, config)?;
    let batch = analyzer.analyze_batch(&documents, &options, &progress).await?;

    let generator = ReportGenerator::with_options(config.output.color_output, true, true, true);

    for (document, error) in batch.failures() {
        println!("❌ {}: {}", document.file_name, error);
    }

    let writer = ReportWriter::new(&generator, format, save_dir, args.save_json);
    let summary = writer.write_batch(&batch, &mut io::stdout().lock());

    for path in &summary.written {
        println!("💾 Saved {}", path.display());
    }
    for (file_name, error) in &summary.failures {
        println!("❌ {}: report not written: {}", file_name, error);
    }

    println!(
        "\n✅ {} analyzed, ❌ {} failed",
        batch.completed_count(),
        batch.failed_count()
    );

    if batch.completed_count() == 0 && batch.failed_count() > 0 {
        bail!("no resume could be analyzed");
    }
    Ok(())
}

fn show_roles(config: &Config, skills: Option<&[String]>) {
    match skills {
        Some(skills) => {
            let matches = match_roles_detailed(skills, &config.catalog);
            if matches.is_empty() {
                println!("🔍 No role shares at least two skills with: {}", skills.join(", "));
                return;
            }
            println!("🎯 Matched roles:");
            for m in matches {
                println!("  • {} (shared: {})", m.role, m.overlapping_skills.join(", "));
            }
        }
        None => {
            println!("📋 Role catalog ({} roles)\n", config.catalog.len());
            for role in config.catalog.iter() {
                println!("  • {}: {}", role.name, role.skills.join(", "));
            }
        }
    }
}
