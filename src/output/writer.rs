//! Writing rendered reports to disk or the terminal

use crate::config::OutputFormat;
use crate::error::{CareerMentorError, Result};
use crate::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use crate::output::report::{BatchReport, DocumentReport};
use log::{error, info};
use std::io::Write;
use std::path::{Path, PathBuf};

/// What happened while writing a batch.
#[derive(Debug, Default)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    /// File name of the document and the error that stopped its output.
    pub failures: Vec<(String, CareerMentorError)>,
}

pub struct ReportWriter<'a> {
    generator: &'a ReportGenerator,
    format: OutputFormat,
    save_dir: Option<PathBuf>,
    save_json: bool,
}

impl<'a> ReportWriter<'a> {
    pub fn new(generator: &'a ReportGenerator, format: OutputFormat, save_dir: Option<PathBuf>, save_json: bool) -> Self {
        Self {
            generator,
            format,
            save_dir,
            save_json,
        }
    }

    /// Render one report and write it out.
    ///
    /// Console, JSON, Markdown and HTML go to `terminal` unless a save
    /// directory is set; PDF always lands in a file, in the working
    /// directory when there is no save directory. Returns the files written.
    pub fn write_report<W: Write>(&self, report: &DocumentReport, terminal: &mut W) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        let file_name = suggest_filename(self.format, &report.document.file_name);

        if self.format == OutputFormat::Console {
            let content = self.generator.generate_report(report, self.format)?;
            writeln!(terminal, "{}", String::from_utf8_lossy(&content))?;

            if let Some(dir) = &self.save_dir {
                let path = dir.join(&file_name);
                save_report_to_file(self.generator.generate_plain_text(report).as_bytes(), &path)?;
                written.push(path);
            }
        } else {
            let content = self.generator.generate_report(report, self.format)?;

            match (&self.save_dir, self.format) {
                (Some(dir), _) => {
                    let path = dir.join(&file_name);
                    save_report_to_file(&content, &path)?;
                    written.push(path);
                }
                (None, OutputFormat::Pdf) => {
                    let path = PathBuf::from(&file_name);
                    save_report_to_file(&content, &path)?;
                    written.push(path);
                }
                (None, _) => writeln!(terminal, "{}", String::from_utf8_lossy(&content))?,
            }
        }

        if self.save_json {
            if let Some(dir) = &self.save_dir {
                written.extend(save_json_artifacts(report, dir)?);
            }
        }

        Ok(written)
    }

    /// Write every completed report; a failure is recorded and the next
    /// document is still written.
    pub fn write_batch<W: Write>(&self, batch: &BatchReport, terminal: &mut W) -> WriteSummary {
        let mut summary = WriteSummary::default();

        for report in batch.reports() {
            match self.write_report(report, terminal) {
                Ok(paths) => summary.written.extend(paths),
                Err(e) => {
                    error!("Failed to write report for {}: {}", report.document.id, e);
                    summary.failures.push((report.document.file_name.clone(), e));
                }
            }
        }

        summary
    }
}

/// `<stem>_parsed_resume.json` and `<stem>_skill_gap_output.json` in `dir`.
pub fn save_json_artifacts(report: &DocumentReport, dir: &Path) -> Result<Vec<PathBuf>> {
    let stem = report.document.stem().replace(' ', "_");

    let parsed_path = dir.join(format!("{}_parsed_resume.json", stem));
    save_report_to_file(&serde_json::to_vec_pretty(&report.parsed_resume_json())?, &parsed_path)?;

    let gap_path = dir.join(format!("{}_skill_gap_output.json", stem));
    save_report_to_file(&serde_json::to_vec_pretty(&report.skill_gap_json())?, &gap_path)?;

    info!("Wrote {} and {}", parsed_path.display(), gap_path.display());
    Ok(vec![parsed_path, gap_path])
}
