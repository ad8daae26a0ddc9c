//! # switchboard-intent
//!
//! A TOML-driven, first-match keyword classifier for the Switchboard
//! dispatcher.
//!
//! ## Overview
//!
//! This crate provides [`KeywordClassifier`], which implements the
//! [`IntentClassifier`](switchboard_core::traits::IntentClassifier) trait.
//! Keyword rules are declared in a TOML file, tried in order, and the first
//! rule with a keyword in the input wins. Unmatched input falls back to
//! `general_conversation`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use switchboard_intent::KeywordClassifier;
//!
//! let classifier = KeywordClassifier::builtin()?;
//! // Pass `Arc::new(classifier)` to `switchboard_core::Dispatcher::new(...)`.
//! ```
//!
//! ## Keyword matching
//!
//! Input and keywords are tokenized the same way and compared token by
//! token, so "db" does not fire on "feedback". Bengali and English keywords
//! can sit in the same rule.

pub mod engine;
pub mod rule;

pub use engine::{detect_language, tokenize, KeywordClassifier, BUILTIN_RULES};
pub use rule::{ClassifierConfig, IntentRoute, IntentRule, DEFAULT_CONFIDENCE};

// ── Tests ─────────────────────────────────────────────────────────────────────
