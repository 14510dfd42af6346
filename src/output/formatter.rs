//! Output formatters: console, JSON, Markdown, HTML and PDF

use crate::config::OutputFormat;
use crate::error::{CareerMentorError, Result};
use crate::output::report::DocumentReport;
use crate::processing::skill_gap::{GapAssessment, SkillGapReport};
use crate::processing::skills::SkillSet;
use askama::Template;
use colored::{Color, Colorize};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use pulldown_cmark::{html, Event, Parser};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Renders one document report into the bytes of a file or terminal view.
pub trait OutputFormatter {
    fn format_report(&self, report: &DocumentReport) -> Result<Vec<u8>>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

pub struct PdfFormatter;

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
    pdf_formatter: PdfFormatter,
}

fn generated_at(report: &DocumentReport) -> String {
    chrono::DateTime::<chrono::Utc>::from(report.metadata.generated_at)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

fn list_or(skills: &SkillSet, empty: &str) -> String {
    if skills.is_empty() {
        empty.to_string()
    } else {
        skills.join(", ")
    }
}

fn required_skills_text(gap: &SkillGapReport) -> String {
    list_or(&gap.required_skills, "Not available")
}

/// Recommendation text, or why there is none.
fn recommendations_text(gap: &SkillGapReport) -> String {
    match (&gap.course_recommendations, &gap.gap) {
        (Some(text), _) => text.clone(),
        (None, GapAssessment::NotComputable { .. }) => {
            "Not available: the skill gap could not be computed.".to_string()
        }
        (None, GapAssessment::Computed { .. }) => "Not requested.".to_string(),
    }
}

fn matched_roles_text(report: &DocumentReport) -> String {
    let names = report.matched_role_names();
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_gap(&self, gap: &GapAssessment) -> String {
        match gap {
            GapAssessment::Computed { missing_skills } if missing_skills.is_empty() => {
                self.colorize(&gap.describe(), Color::Green)
            }
            GapAssessment::Computed { .. } => self.colorize(&gap.describe(), Color::Red),
            GapAssessment::NotComputable { .. } => self.colorize(&gap.describe(), Color::Yellow),
        }
    }

    pub fn render(&self, report: &DocumentReport) -> String {
        let gap = &report.skill_gap;
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("🎓 {}", report.title()), 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            generated_at(report),
            report.metadata.processing_time_ms
        ));

        output.push_str(&self.format_header("Candidate", 2));
        output.push_str(&format!("👤 Name: {}\n", report.candidate_name().unwrap_or("Unknown")));
        if let Some(email) = report.profile.email() {
            output.push_str(&format!("📧 Email: {}\n", email));
        }
        if let Some(phone) = report.profile.phone() {
            output.push_str(&format!("📞 Phone: {}\n", phone));
        }

        output.push_str(&self.format_header("Roles", 2));
        output.push_str(&format!(
            "🎯 Suggested Role: {}\n",
            self.colorize(&report.extraction.suggested_role, Color::Cyan)
        ));
        output.push_str(&format!("🧭 Matched Roles: {}\n", matched_roles_text(report)));
        output.push_str(&format!("📌 Target Role: {}\n", gap.target_role));

        output.push_str(&self.format_header("Skills", 2));
        output.push_str(&format!("🧠 Resume Skills: {}\n", list_or(&gap.resume_skills, "None found")));
        output.push_str(&format!("✅ Required Skills: {}\n", required_skills_text(gap)));
        output.push_str(&format!("❌ Missing Skills: {}\n", self.format_gap(&gap.gap)));

        output.push_str(&self.format_header("📚 Course Recommendations", 2));
        output.push_str(&recommendations_text(gap));
        output.push('\n');

        if report.extraction.fallback {
            output.push_str(&format!(
                "\n{}\n",
                self.colorize("⚠️  The model reply could not be parsed; only locally detected skills were used.", Color::Yellow)
            ));
        }

        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &DocumentReport) -> Result<Vec<u8>> {
        Ok(self.render(report).into_bytes())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &DocumentReport) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(report)?
        } else {
            serde_json::to_vec(report)?
        };
        Ok(bytes)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &DocumentReport) -> Result<Vec<u8>> {
        let gap = &report.skill_gap;
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", report.title()));
        md.push_str(&format!("**Candidate:** {}\n\n", report.candidate_name().unwrap_or("Unknown")));
        if let Some(email) = report.profile.email() {
            md.push_str(&format!("**Email:** {}\n\n", email));
        }
        if let Some(phone) = report.profile.phone() {
            md.push_str(&format!("**Phone:** {}\n\n", phone));
        }

        md.push_str("## 🎯 Roles\n\n");
        md.push_str(&format!("- **Suggested Role:** {}\n", report.extraction.suggested_role));
        md.push_str(&format!("- **Matched Roles:** {}\n", matched_roles_text(report)));
        md.push_str(&format!("- **Target Role:** {}\n\n", gap.target_role));

        md.push_str("## 🧠 Skills\n\n");
        md.push_str("| | Skills |\n|---|---|\n");
        md.push_str(&format!("| Resume | {} |\n", list_or(&gap.resume_skills, "None found")));
        md.push_str(&format!("| Required | {} |\n", required_skills_text(gap)));
        md.push_str(&format!("| Missing | {} |\n\n", gap.gap.describe()));

        md.push_str("## 📚 Course Recommendations\n\n");
        md.push_str(recommendations_text(gap).trim_end());
        md.push_str("\n");

        if self.include_metadata {
            md.push_str("\n---\n\n");
            md.push_str(&format!(
                "*Generated {} by Career Mentor v{} ({}, {}) in {}ms*\n",
                generated_at(report),
                report.metadata.mentor_version,
                report.metadata.llm_model,
                report.metadata.extraction_backend,
                report.metadata.processing_time_ms
            ));
        }

        Ok(md.into_bytes())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        h1 {
            color: #2196f3;
            text-align: center;
            border-bottom: 3px solid #2196f3;
            padding-bottom: 20px;
        }
        .section h2 {
            color: #007acc;
            border-bottom: 2px solid #e9ecef;
            padding-bottom: 10px;
        }
        .skill {
            display: inline-block;
            padding: 4px 12px;
            margin: 3px;
            border-radius: 14px;
            background: #e3f2fd;
        }
        .skill.missing { background: #f8d7da; }
        .notice {
            padding: 12px 16px;
            border-left: 4px solid #ffc107;
            background: #fff8e1;
        }
        .metadata {
            margin-top: 30px;
            font-size: 0.9em;
            color: #6c757d;
        }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <h1>{{ title }}</h1>
        <div class="section">
            <h2>👤 Candidate</h2>
            <p><strong>Name:</strong> {{ candidate }}</p>
            {% if !email.is_empty() %}<p><strong>Email:</strong> {{ email }}</p>{% endif %}
            {% if !phone.is_empty() %}<p><strong>Phone:</strong> {{ phone }}</p>{% endif %}
        </div>
        <div class="section">
            <h2>🎯 Roles</h2>
            <p><strong>Suggested Role:</strong> {{ suggested_role }}</p>
            <p><strong>Matched Roles:</strong> {{ matched_roles }}</p>
            <p><strong>Target Role:</strong> {{ target_role }}</p>
        </div>
        <div class="section">
            <h2>🧠 Resume Skills</h2>
            {% for skill in resume_skills %}<span class="skill">{{ skill }}</span>{% endfor %}
            <h2>✅ Required Skills</h2>
            {% if required_skills.is_empty() %}<p>Not available</p>{% endif %}
            {% for skill in required_skills %}<span class="skill">{{ skill }}</span>{% endfor %}
            <h2>❌ Missing Skills</h2>
            {% if gap_computable %}
            {% if missing_skills.is_empty() %}<p>{{ gap_summary }}</p>{% endif %}
            {% for skill in missing_skills %}<span class="skill missing">{{ skill }}</span>{% endfor %}
            {% else %}
            <p class="notice">{{ gap_summary }}</p>
            {% endif %}
        </div>
        <div class="section">
            <h2>📚 Course Recommendations</h2>
            {{ recommendations_html|safe }}
        </div>
        <div class="metadata">
            <p><strong>Generated:</strong> {{ generated_at }} | <strong>Processing time:</strong> {{ processing_time }}ms</p>
            <p><strong>Career Mentor</strong> v{{ version }} | {{ llm_model }} | {{ extraction_backend }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    title: String,
    candidate: String,
    email: String,
    phone: String,
    suggested_role: String,
    matched_roles: String,
    target_role: String,
    resume_skills: Vec<String>,
    required_skills: Vec<String>,
    missing_skills: Vec<String>,
    gap_computable: bool,
    gap_summary: String,
    recommendations_html: String,
    generated_at: String,
    processing_time: u64,
    version: String,
    llm_model: String,
    extraction_backend: String,
}

/// Tags the course prompt asks the model to use.
const RECOMMENDATION_TAGS: &[&str] = &["h6", "ul", "li"];

/// Render model-written markdown; raw HTML keeps only bare `<h6>`, `<ul>`
/// and `<li>` tags, and any other text inside it is escaped.
fn recommendations_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown).map(|event| match event {
        Event::Html(raw) => Event::Html(sanitize_raw_html(&raw).into()),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn sanitize_raw_html(raw: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("Invalid tag regex"));

    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for tag in tag_re.find_iter(raw) {
        escape_html_into(&mut out, &raw[last..tag.start()]);

        let text = tag.as_str();
        let closing = text.starts_with("</");
        let name = text.trim_start_matches('<').trim_start_matches('/').trim_end_matches('>').trim();
        if let Some(allowed) = RECOMMENDATION_TAGS.iter().find(|t| t.eq_ignore_ascii_case(name)) {
            out.push_str(if closing { "</" } else { "<" });
            out.push_str(allowed);
            out.push('>');
        }
        last = tag.end();
    }
    escape_html_into(&mut out, &raw[last..]);
    out
}

fn escape_html_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &DocumentReport) -> HtmlTemplate {
        let gap = &report.skill_gap;

        let recommendations_html = recommendations_to_html(&recommendations_text(gap));

        HtmlTemplate {
            include_styles: self.include_styles,
            title: report.title(),
            candidate: report.candidate_name().unwrap_or("Unknown").to_string(),
            email: report.profile.email().unwrap_or_default().to_string(),
            phone: report.profile.phone().unwrap_or_default().to_string(),
            suggested_role: report.extraction.suggested_role.clone(),
            matched_roles: matched_roles_text(report),
            target_role: gap.target_role.clone(),
            resume_skills: gap.resume_skills.as_slice().to_vec(),
            required_skills: gap.required_skills.as_slice().to_vec(),
            missing_skills: gap.gap.missing().map(|m| m.as_slice().to_vec()).unwrap_or_default(),
            gap_computable: gap.gap.is_computable(),
            gap_summary: gap.gap.describe(),
            recommendations_html,
            generated_at: generated_at(report),
            processing_time: report.metadata.processing_time_ms,
            version: report.metadata.mentor_version.clone(),
            llm_model: report.metadata.llm_model.clone(),
            extraction_backend: report.metadata.extraction_backend.clone(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &DocumentReport) -> Result<Vec<u8>> {
        let rendered = self
            .create_template_data(report)
            .render()
            .map_err(|e| CareerMentorError::OutputFormatting(e.to_string()))?;
        Ok(rendered.into_bytes())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PdfStyle {
    Title,
    Heading,
    Body,
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
struct PdfLine {
    style: PdfStyle,
    text: String,
}

const PDF_WRAP_CHARS: usize = 95;
const PDF_TITLE_WRAP_CHARS: usize = 60;

impl PdfLine {
    fn new(style: PdfStyle, text: impl Into<String>) -> Self {
        Self { style, text: text.into() }
    }

    fn blank() -> Self {
        Self::new(PdfStyle::Blank, "")
    }
}

fn pdf_err<E: std::fmt::Display>(e: E) -> CareerMentorError {
    CareerMentorError::OutputFormatting(format!("PDF generation failed: {}", e))
}

/// Map typographic characters into WinAnsi and drop what the built-in
/// fonts cannot show.
pub fn sanitize_for_pdf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{25CF}' | '\u{25AA}' | '\u{2023}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2192}' => out.push_str("->"),
            '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' => out.push(' '),
            '\t' => out.push_str("    "),
            c if (c as u32) < 0x20 => {}
            c if (c as u32) <= 0x7E => out.push(c),
            c if (0xA1..=0xFF).contains(&(c as u32)) => out.push(c),
            _ => {}
        }
    }
    out.trim_end().to_string()
}

/// Plain lines of the recommendation text: tags and markdown markup removed,
/// list items prefixed with "- ".
fn flatten_recommendations(markdown: &str) -> Vec<String> {
    let text = markdown
        .replace("<h6>", "")
        .replace("</h6>", "")
        .replace("<ul>", "")
        .replace("</ul>", "")
        .replace("<li>", "- ")
        .replace("</li>", "");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let line = line.trim_start_matches('#').trim_start();
            let line = if let Some(item) = line.strip_prefix("* ").or_else(|| line.strip_prefix("+ ")) {
                format!("- {}", item)
            } else {
                line.to_string()
            };
            line.replace("**", "").replace('`', "")
        })
        .collect()
}

/// Greedy word wrap on character counts.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() { word.chars().count() } else { current.chars().count() + 1 + word.chars().count() };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if word.chars().count() > width {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = chunk.iter().collect();
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

impl PdfFormatter {
    pub fn new() -> Self {
        Self
    }

    fn layout(&self, report: &DocumentReport) -> Vec<PdfLine> {
        let gap = &report.skill_gap;
        let mut lines = Vec::new();

        let push_wrapped = |lines: &mut Vec<PdfLine>, style: PdfStyle, text: &str| {
            let width = if style == PdfStyle::Title { PDF_TITLE_WRAP_CHARS } else { PDF_WRAP_CHARS };
            for wrapped in wrap_text(&sanitize_for_pdf(text), width) {
                lines.push(PdfLine::new(style, wrapped));
            }
        };

        push_wrapped(&mut lines, PdfStyle::Title, &report.title());
        lines.push(PdfLine::blank());

        push_wrapped(&mut lines, PdfStyle::Body, &format!("Candidate: {}", report.candidate_name().unwrap_or("Unknown")));
        push_wrapped(&mut lines, PdfStyle::Body, &format!("Suggested Role: {}", report.extraction.suggested_role));
        push_wrapped(&mut lines, PdfStyle::Body, &format!("Matched Roles: {}", matched_roles_text(report)));
        push_wrapped(&mut lines, PdfStyle::Body, &format!("Target Role: {}", gap.target_role));
        lines.push(PdfLine::blank());

        let sections = [
            ("Resume Skills", list_or(&gap.resume_skills, "None found")),
            ("Required Skills", required_skills_text(gap)),
            ("Missing Skills", gap.gap.describe()),
        ];
        for (heading, body) in sections {
            lines.push(PdfLine::new(PdfStyle::Heading, heading));
            push_wrapped(&mut lines, PdfStyle::Body, &body);
            lines.push(PdfLine::blank());
        }

        lines.push(PdfLine::new(PdfStyle::Heading, "Course Recommendations"));
        for line in flatten_recommendations(&recommendations_text(gap)) {
            push_wrapped(&mut lines, PdfStyle::Body, &line);
        }

        lines
    }
}

impl Default for PdfFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for PdfFormatter {
    fn format_report(&self, report: &DocumentReport) -> Result<Vec<u8>> {
        let (doc, page, layer) = PdfDocument::new("Smart Career Mentor Report", Mm(210.0), Mm(297.0), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;

        let mut current_layer = doc.get_page(page).get_layer(layer);
        let mut y = 277.0;

        for line in self.layout(report) {
            let (font_size, font, height) = match line.style {
                PdfStyle::Title => (16.0, &bold, 9.0),
                PdfStyle::Heading => (12.0, &bold, 7.0),
                PdfStyle::Body => (10.0, &regular, 5.5),
                PdfStyle::Blank => (10.0, &regular, 4.0),
            };

            if y - height < 20.0 {
                let (next_page, next_layer) = doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
                current_layer = doc.get_page(next_page).get_layer(next_layer);
                y = 277.0;
            }

            if line.style != PdfStyle::Blank {
                current_layer.use_text(line.text, font_size, Mm(20.0), Mm(y), font);
            }
            y -= height;
        }

        doc.save_to_bytes().map_err(pdf_err)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, true, true, true)
    }

    pub fn with_options(use_colors: bool, pretty_json: bool, include_metadata: bool, include_html_styles: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(include_html_styles),
            pdf_formatter: PdfFormatter::new(),
        }
    }

    pub fn generate_report(&self, report: &DocumentReport, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
            OutputFormat::Pdf => self.pdf_formatter.format_report(report),
        }
    }

    /// Console rendering with colors off, for saving to disk.
    pub fn generate_plain_text(&self, report: &DocumentReport) -> String {
        ConsoleFormatter::new(false).render(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &[u8], file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

/// `<stem>_analysis.<ext>` for the uploaded file name.
pub fn suggest_filename(format: OutputFormat, file_name: &str) -> String {
    let base_name = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().replace(' ', "_"))
        .unwrap_or_else(|| "resume".to_string());

    format!("{}_analysis.{}", base_name, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::extractor::ExtractionResult;
    use crate::output::report::{ReportMetadata, UploadedDocument};
    use crate::processing::role_matcher::RoleMatch;
    use crate::processing::text_processor::TextProcessor;

    fn sample_report(gap: SkillGapReport) -> DocumentReport {
        let profile = TextProcessor::new()
            .unwrap()
            .parse_profile("Jane Doe\njane.doe@example.com\nDocker, Terraform");

        DocumentReport {
            document: UploadedDocument::from_path(Path::new("Jane Doe CV.pdf")),
            profile,
            extraction: ExtractionResult {
                name: Some("Jane Doe".to_string()),
                skills: vec!["Docker".to_string(), "CI/CD".to_string()],
                suggested_role: "DevOps Engineer".to_string(),
                fallback: false,
            },
            matched_roles: vec![RoleMatch {
                role: "DevOps Engineer".to_string(),
                overlapping_skills: vec!["CI/CD".to_string(), "Docker".to_string()],
            }],
            skill_gap: gap,
            metadata: ReportMetadata::new(42, "gpt-4o", "pdf-extract"),
        }
    }

    fn computed_gap() -> SkillGapReport {
        let resume: SkillSet = ["Docker", "CI/CD", "terraform"].into_iter().collect();
        let required: SkillSet = ["CI/CD", "Docker", "Kubernetes"].into_iter().collect();
        SkillGapReport::new("DevOps Engineer", resume, required).with_recommendations(
            "<h6>Kubernetes</h6>\n<ul>\n<li>Kubernetes Basics – Microsoft Learn</li>\n</ul>\n* **CNCF** tutorials 🚀".to_string(),
        )
    }

    fn uncomputable_gap() -> SkillGapReport {
        let resume: SkillSet = ["Docker"].into_iter().collect();
        SkillGapReport::without_target("Not identified", resume, "no target role identified")
    }

    #[test]
    fn test_console_distinguishes_gap_states() {
        let formatter = ConsoleFormatter::new(false);

        let computed = formatter.render(&sample_report(computed_gap()));
        assert!(computed.contains("Smart Career Mentor Report: Jane Doe CV.pdf"));
        assert!(computed.contains("❌ Missing Skills: Kubernetes"));

        let uncomputable = formatter.render(&sample_report(uncomputable_gap()));
        assert!(uncomputable.contains("Missing Skills: Not computable (no target role identified)"));
        assert!(uncomputable.contains("Required Skills: Not available"));
        assert!(uncomputable.contains("the skill gap could not be computed"));
    }

    #[test]
    fn test_json_keeps_gap_status() {
        let bytes = JsonFormatter::new(false).format_report(&sample_report(uncomputable_gap())).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["skill_gap"]["gap"]["status"], "not_computable");
        assert_eq!(value["skill_gap"]["resume_skills"][0], "Docker");
        assert_eq!(value["extraction"]["suggested_role"], "DevOps Engineer");
    }

    #[test]
    fn test_markdown_sections() {
        let bytes = MarkdownFormatter::new(true).format_report(&sample_report(computed_gap())).unwrap();
        let md = String::from_utf8(bytes).unwrap();

        assert!(md.starts_with("# Smart Career Mentor Report: Jane Doe CV.pdf"));
        assert!(md.contains("| Missing | Kubernetes |"));
        assert!(md.contains("## 📚 Course Recommendations"));
        assert!(md.contains("gpt-4o"));
    }

    #[test]
    fn test_html_escapes_fields_and_renders_recommendations() {
        let mut report = sample_report(computed_gap());
        report.extraction.suggested_role = "R&D <Engineer>".to_string();

        let html = String::from_utf8(HtmlFormatter::new(true).format_report(&report).unwrap()).unwrap();

        assert!(html.contains("R&amp;D &lt;Engineer&gt;") || html.contains("R&#38;D &#60;Engineer&#62;"));
        assert!(html.contains("<h6>Kubernetes</h6>"));
        assert!(html.contains("class=\"skill missing\">Kubernetes<"));
    }

    #[test]
    fn test_recommendations_drop_untrusted_html() {
        let html = recommendations_to_html(
            "<h6>Docker</h6>\n<script>alert('x')</script>\n<ul>\n<li>Docker Docs</li>\n</ul>\n\n\
             Try <iframe src=\"https://evil.example\"></iframe> this <img src=x onerror=alert(1)> course.\n",
        );

        assert!(html.contains("<h6>Docker</h6>"));
        assert!(html.contains("<li>Docker Docs</li>"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("<iframe"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_sanitize_raw_html_escapes_stray_brackets() {
        assert_eq!(sanitize_raw_html("<li class=\"x\">a & b</li> <script"), "a &amp; b</li> &lt;script");
    }

    #[test]
    fn test_sanitize_for_pdf() {
        assert_eq!(sanitize_for_pdf("“Cloud” – café… 🚀"), "\"Cloud\" - café...");
        assert_eq!(sanitize_for_pdf("a\u{00A0}b\tc"), "a b    c");
    }

    #[test]
    fn test_flatten_recommendations() {
        let lines = flatten_recommendations("### Kubernetes\n<h6>Docker</h6>\n<ul>\n<li>Docker Docs</li>\n</ul>\n* **Udemy** course\n");
        assert_eq!(lines, vec!["Kubernetes", "Docker", "- Docker Docs", "- Udemy course"]);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_pdf_layout_and_bytes() {
        let formatter = PdfFormatter::new();
        let report = sample_report(computed_gap());

        let lines = formatter.layout(&report);
        assert_eq!(lines[0].style, PdfStyle::Title);
        assert!(lines.iter().any(|l| l.text == "- Kubernetes Basics - Microsoft Learn"));
        assert!(lines.iter().any(|l| l.text == "- CNCF tutorials"));
        assert!(lines.iter().all(|l| l.text.chars().all(|c| (c as u32) <= 0xFF)));

        let bytes = formatter.format_report(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_suggest_filename() {
        assert_eq!(suggest_filename(OutputFormat::Pdf, "Jane Doe CV.pdf"), "Jane_Doe_CV_analysis.pdf");
        assert_eq!(suggest_filename(OutputFormat::Markdown, "resume.docx"), "resume_analysis.md");
        assert_eq!(suggest_filename(OutputFormat::Console, "resume"), "resume_analysis.txt");
    }
}
