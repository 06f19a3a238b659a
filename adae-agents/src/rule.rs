//! Rule-based intent resolver
//!
//! Scans the upper-cased question for keywords, category by category. The
//! first category with a hit wins, and within it the first keyword in
//! priority order supplies the filter value (or its canonical expansion).
//! A question with no hit resolves to the fallback intent, which by default
//! is the deliberate no-match sentinel `AETERM == "UNKNOWN"`.

use adae_core::{
    AdaeResult, ConfigError, Intent, IntentResolver, Schema, ORGAN_CLASS_COLUMN,
    SEVERITY_COLUMN, TERM_COLUMN, UNKNOWN_FILTER_VALUE,
};
use async_trait::async_trait;

/// A keyword and the value it expands to.
///
/// The token is upper-cased on construction to match the upper-cased question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    token: String,
    canonical: Option<String>,
}

impl Keyword {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into().to_uppercase(),
            canonical: None,
        }
    }

    pub fn expanding(token: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            token: token.into().to_uppercase(),
            canonical: Some(canonical.into()),
        }
    }

    /// Token searched for in the upper-cased question
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Filter value emitted instead of the token
    pub fn canonical(&self) -> Option<&str> {
        self.canonical.as_deref()
    }

    fn filter_value(&self) -> &str {
        self.canonical.as_deref().unwrap_or(&self.token)
    }
}

/// One keyword category, bound to a schema column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub column: String,
    /// Keywords in priority order
    pub keywords: Vec<Keyword>,
}

impl KeywordRule {
    pub fn new(column: impl Into<String>, keywords: Vec<Keyword>) -> Self {
        Self {
            column: column.into(),
            keywords,
        }
    }
}

/// Deterministic keyword-table resolver.
#[derive(Debug, Clone)]
pub struct RuleBasedResolver {
    schema: Schema,
    rules: Vec<KeywordRule>,
    fallback_column: String,
    fallback_value: String,
}

impl RuleBasedResolver {
    /// Build a resolver over a custom keyword table.
    ///
    /// Every rule column and the fallback column must be schema keys, so
    /// `resolve` can never emit an out-of-schema intent.
    pub fn new(
        schema: Schema,
        rules: Vec<KeywordRule>,
        fallback_column: impl Into<String>,
        fallback_value: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let fallback_column = fallback_column.into();
        for column in rules.iter().map(|r| &r.column).chain(Some(&fallback_column)) {
            if !schema.contains(column) {
                return Err(ConfigError::InvalidValue {
                    field: "rules.column".to_string(),
                    value: column.clone(),
                    reason: format!("not in schema ({})", schema.column_names().join(", ")),
                });
            }
        }
        if let Some(rule) = rules.iter().find(|r| r.keywords.iter().any(|k| k.token.is_empty())) {
            return Err(ConfigError::InvalidValue {
                field: "rules.keywords".to_string(),
                value: rule.column.clone(),
                reason: "keyword tokens must not be empty".to_string(),
            });
        }

        Ok(Self {
            schema,
            rules,
            fallback_column,
            fallback_value: fallback_value.into(),
        })
    }

    /// The reference adverse-event keyword table.
    pub fn adae() -> Self {
        Self {
            schema: Schema::adae(),
            rules: vec![
                KeywordRule::new(
                    SEVERITY_COLUMN,
                    vec![
                        Keyword::new("MILD"),
                        Keyword::new("MODERATE"),
                        Keyword::new("SEVERE"),
                    ],
                ),
                KeywordRule::new(
                    TERM_COLUMN,
                    vec![
                        Keyword::new("HEADACHE"),
                        Keyword::new("NAUSEA"),
                        Keyword::new("DIZZINESS"),
                    ],
                ),
                KeywordRule::new(
                    ORGAN_CLASS_COLUMN,
                    vec![
                        Keyword::expanding("CARDIAC", "CARDIAC DISORDERS"),
                        Keyword::expanding("SKIN", "SKIN AND SUBCUTANEOUS TISSUE DISORDERS"),
                        Keyword::expanding("NERVOUS", "NERVOUS SYSTEM DISORDERS"),
                    ],
                ),
            ],
            fallback_column: TERM_COLUMN.to_string(),
            fallback_value: UNKNOWN_FILTER_VALUE.to_string(),
        }
    }

    /// The reference keyword table bound to `schema`.
    ///
    /// Fails when `schema` lacks a column the table targets.
    pub fn for_schema(schema: Schema) -> Result<Self, ConfigError> {
        let reference = Self::adae();
        Self::new(
            schema,
            reference.rules,
            reference.fallback_column,
            reference.fallback_value,
        )
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Synchronous classification used by `resolve`.
    pub fn classify(&self, question: &str) -> AdaeResult<Intent> {
        let upper = question.to_uppercase();

        for rule in &self.rules {
            if let Some(keyword) = rule.keywords.iter().find(|k| upper.contains(&k.token)) {
                return Ok(Intent::new(&self.schema, &rule.column, keyword.filter_value())?);
            }
        }

        Ok(Intent::new(
            &self.schema,
            &self.fallback_column,
            &self.fallback_value,
        )?)
    }
}

impl Default for RuleBasedResolver {
    fn default() -> Self {
        Self::adae()
    }
}

#[async_trait]
impl IntentResolver for RuleBasedResolver {
    async fn resolve(&self, question: &str) -> AdaeResult<Intent> {
        self.classify(question)
    }

    fn backend_name(&self) -> &str {
        "rule"
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_target_column_always_in_schema(question in "\\PC{0,80}") {
            let intent = RuleBasedResolver::adae().classify(&question).unwrap();
            prop_assert!(Schema::adae().contains(intent.target_column()));
        }

        #[test]
        fn prop_classification_is_deterministic(question in "[a-zA-Z ?.]{0,60}") {
            let resolver = RuleBasedResolver::adae();
            prop_assert_eq!(
                resolver.classify(&question).unwrap(),
                resolver.classify(&question).unwrap()
            );
        }

        #[test]
        fn prop_case_of_question_is_irrelevant(question in "[a-zA-Z ]{0,60}") {
            let resolver = RuleBasedResolver::adae();
            prop_assert_eq!(
                resolver.classify(&question.to_lowercase()).unwrap(),
                resolver.classify(&question.to_uppercase()).unwrap()
            );
        }
    }
}
