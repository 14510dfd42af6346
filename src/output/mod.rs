//! Report structures and renderers

pub mod formatter;
pub mod report;
pub mod writer;

pub use formatter::ReportGenerator;
pub use report::{BatchReport, DocumentOutcome, DocumentReport};
pub use writer::ReportWriter;
