//! Reposcope Report - Markdown report assembly and reading it back
//!
//! The assembler writes one card per analyzed repository; the parser turns
//! a report into [`ProjectCard`]s again and the card renderer draws them in
//! the terminal.
//!
//! [`ProjectCard`]: reposcope_core::ProjectCard

pub mod assembler;
pub mod card;
pub mod parser;

pub use assembler::{card_tags, short_description, ReportAssembler};
pub use card::{format_card, format_score, CARD_WIDTH};
pub use parser::{load_report, parse_report};
