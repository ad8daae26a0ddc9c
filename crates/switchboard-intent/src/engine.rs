//! Keyword intent classifier.
//!
//! `KeywordClassifier` loads a `ClassifierConfig` from a TOML string or file
//! and implements the `IntentClassifier` trait from switchboard-core.
//!
//! Classification algorithm:
//!
//! 1. Detect the language: any Bengali-script character → `bn`, else `en`.
//! 2. Tokenize: split on whitespace, ASCII punctuation and the danda marks,
//!    then lowercase.
//! 3. Iterate rules in declaration order; the first rule with a keyword
//!    equal to a token (or to a contiguous token run) wins.
//! 4. No rule matched → `general_conversation` at `default_confidence`.
//! 5. Attach the intent's route, if one is configured.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use switchboard_contracts::{
    error::{SwitchboardError, SwitchboardResult},
    intent::{Intent, IntentResult, Language},
};
use switchboard_core::traits::IntentClassifier;

use crate::rule::{ClassifierConfig, IntentRoute};

/// Rules file compiled into the binary.
pub const BUILTIN_RULES: &str = include_str!("../rules/intents.toml");

const BENGALI_BLOCK: std::ops::RangeInclusive<char> = '\u{0980}'..='\u{09FF}';
const DANDA: char = '\u{0964}';
const DOUBLE_DANDA: char = '\u{0965}';

/// A rule with its keywords already tokenized.
#[derive(Debug)]
struct CompiledRule {
    intent: Intent,
    confidence: f64,
    keywords: Vec<Vec<String>>,
}

impl CompiledRule {
    fn matches(&self, tokens: &[String]) -> bool {
        self.keywords
            .iter()
            .any(|kw| tokens.windows(kw.len()).any(|run| run == kw.as_slice()))
    }
}

/// An `IntentClassifier` driven by a TOML keyword table.
///
/// ```rust,ignore
/// use switchboard_intent::KeywordClassifier;
///
/// let classifier = KeywordClassifier::builtin()?;
/// let result = classifier.classify("server is down");
/// ```
#[derive(Debug)]
pub struct KeywordClassifier {
    default_confidence: f64,
    rules: Vec<CompiledRule>,
    routes: HashMap<Intent, IntentRoute>,
}

impl KeywordClassifier {
    /// Parse `s` as TOML and build a classifier.
    ///
    /// Returns `SwitchboardError::ConfigError` if the TOML is malformed, a
    /// confidence lies outside [0, 1], a keyword is blank, or an intent has
    /// two routes.
    pub fn from_toml_str(s: &str) -> SwitchboardResult<Self> {
        let config: ClassifierConfig = toml::from_str(s).map_err(|e| SwitchboardError::ConfigError {
            reason: format!("failed to parse intent rules TOML: {}", e),
        })?;
        Self::from_config(config)
    }

    /// Read the file at `path` and parse it as an intent rules file.
    pub fn from_file(path: &Path) -> SwitchboardResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SwitchboardError::ConfigError {
            reason: format!("failed to read intent rules file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The classifier built from `BUILTIN_RULES`.
    pub fn builtin() -> SwitchboardResult<Self> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    pub fn from_config(config: ClassifierConfig) -> SwitchboardResult<Self> {
        check_confidence("default_confidence", config.default_confidence)?;

        let mut rules = Vec::with_capacity(config.rules.len());
        for rule in config.rules {
            check_confidence(rule.intent.as_str(), rule.confidence)?;

            let mut keywords = Vec::with_capacity(rule.keywords.len());
            for keyword in &rule.keywords {
                let tokens = tokenize(keyword);
                if tokens.is_empty() {
                    return Err(SwitchboardError::ConfigError {
                        reason: format!("rule '{}' has a blank keyword", rule.intent),
                    });
                }
                keywords.push(tokens);
            }
            if keywords.is_empty() {
                warn!(intent = %rule.intent, "rule has no keywords and will never match");
            }

            rules.push(CompiledRule {
                intent: rule.intent,
                confidence: rule.confidence,
                keywords,
            });
        }

        let mut routes = HashMap::with_capacity(config.routes.len());
        for route in config.routes {
            let intent = route.intent;
            if routes.insert(intent, route).is_some() {
                return Err(SwitchboardError::ConfigError {
                    reason: format!("intent '{}' has more than one route", intent),
                });
            }
        }

        debug!(rules = rules.len(), routes = routes.len(), "intent rules loaded");

        Ok(Self {
            default_confidence: config.default_confidence,
            rules,
            routes,
        })
    }

    pub fn default_confidence(&self) -> f64 {
        self.default_confidence
    }

    pub fn route(&self, intent: Intent) -> Option<&IntentRoute> {
        self.routes.get(&intent)
    }

    fn result_for(&self, intent: Intent, confidence: f64, language: Language) -> IntentResult {
        let mut result = IntentResult::bare(intent, confidence, language);
        if let Some(route) = self.routes.get(&intent) {
            result.required_capabilities = route.required_capabilities.clone();
            result.suggested_agents = route.suggested_agents.clone();
            result.suggested_providers = route.suggested_providers.clone();
            result.provider_category = route.provider_category;
        }
        result
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> IntentResult {
        let language = detect_language(text);
        let tokens = tokenize(text);

        for rule in &self.rules {
            if rule.matches(&tokens) {
                debug!(intent = %rule.intent, confidence = rule.confidence, "rule matched");
                return self.result_for(rule.intent, rule.confidence, language);
            }
        }

        self.result_for(Intent::GeneralConversation, self.default_confidence, language)
    }
}

fn check_confidence(what: &str, value: f64) -> SwitchboardResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SwitchboardError::ConfigError {
            reason: format!("confidence for '{}' must be within [0, 1], got {}", what, value),
        })
    }
}

/// `bn` if any character is in the Bengali block, `en` otherwise.
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(|c| BENGALI_BLOCK.contains(&c)) {
        Language::Bengali
    } else {
        Language::English
    }
}

/// Lowercased tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| {
        c.is_whitespace() || c.is_ascii_punctuation() || c == DANDA || c == DOUBLE_DANDA
    })
    .filter(|t| !t.is_empty())
    .map(str::to_lowercase)
    .collect()
}
