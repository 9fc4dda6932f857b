//! Lightweight context analysis for coaching conversations
//!
//! Produces a structured [`UserContext`] from a raw user message using pure
//! string and set operations: spelling correction, sentiment scoring,
//! emotion/challenge/strength extraction, intent classification and theme
//! derivation. No probabilistic model, no external NLP dependency.
//!
//! The analyzer sits on the hot path of every message and is total: it never
//! fails, and degenerate input yields a neutral context.

mod analyzer;
mod context;
mod lexicon;
mod spelling;

pub use analyzer::ContextAnalyzer;
pub use context::{ConfidenceLevel, Readiness, UserContext, UserIntent};
pub use spelling::correct_spelling;
