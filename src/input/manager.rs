//! Input manager routing documents to the right extractor

use crate::error::{CareerMentorError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{DocumentExtractor, MarkdownExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager<'a, E: DocumentExtractor> {
    backend: &'a E,
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl<'a, E: DocumentExtractor> InputManager<'a, E> {
    pub fn new(backend: &'a E) -> Self {
        Self {
            backend,
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Plain text of one document, lines joined with newlines.
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(CareerMentorError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let file_type = self.detect_file_type(path)?;

        let text = match file_type {
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Pdf | FileType::Docx => {
                if !self.backend.supports(file_type) {
                    return Err(CareerMentorError::UnsupportedFormat(format!(
                        "{} cannot be read by the {} backend",
                        path.display(),
                        self.backend.backend_name()
                    )));
                }
                info!("Extracting text with {}: {}", self.backend.backend_name(), path.display());
                self.backend.extract_lines(path, file_type).await?.join("\n")
            }
            FileType::Unknown => {
                return Err(CareerMentorError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    path.display()
                )));
            }
        };

        if text.trim().is_empty() {
            return Err(CareerMentorError::DocumentUnreadable(format!(
                "No text found in {}",
                path.display()
            )));
        }

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    fn detect_file_type(&self, path: &Path) -> Result<FileType> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| CareerMentorError::InvalidInput(format!("File has no extension: {}", path.display())))?;

        Ok(FileType::from_extension(extension))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
