//! Normalization of scraped exam-question records.
//!
//! - [`text`]: whitespace, slug and question-number canonicalization
//! - [`label`]: externalized label table for subject/chapter/subtopic names
//! - [`title`]: pipe-delimited page title parser
//! - [`answer`]: correct-option resolution
//! - [`ids`]: deterministic node identifiers
//! - [`record`]: per-record cleanup combining all of the above

pub mod answer;
pub mod error;
pub mod ids;
pub mod label;
pub mod record;
pub mod text;
pub mod title;

pub use answer::{AnswerStrategy, Resolution, resolve_answer, resolve_answer_detailed};
pub use error::{NormalizeError, Result};
pub use ids::{
    chapter_id, normalize_id, option_id, paper_id, question_id, subject_id, subtopic_id,
};
pub use label::{LabelEntry, LabelScope, LabelTable};
pub use record::{CleanRecord, DEFAULT_SUBJECT, SkipReason, clean_record};
pub use text::{canonical_question_no, clean_label, normalize_text, slugify};
pub use title::{ParsedTitle, TitleLayout, parse_title};
