// Text Module
//
// - cleaner.rs: hallucination filter applied to raw model output
// - keywords.rs: user keyword registry and post-hoc correction

pub mod cleaner;
pub mod keywords;

pub use cleaner::TranscriptCleaner;
pub use keywords::{apply_keywords, Keyword, KeywordSet};
