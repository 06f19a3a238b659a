//! Case-insensitive substring matching
//!
//! A value matches when it contains the needle, ignoring case. Null values
//! never match. An empty needle matches every non-null value.

/// Pre-folded substring matcher for a single filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainsMatcher {
    needle: String,
}

impl ContainsMatcher {
    pub fn new(needle: &str) -> Self {
        Self {
            needle: needle.to_uppercase(),
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match value {
            Some(value) => value.to_uppercase().contains(&self.needle),
            None => false,
        }
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_case_of_needle_is_irrelevant(
            hay in "[a-zA-Z ]{0,30}",
            needle in "[a-zA-Z]{0,5}",
        ) {
            let upper = ContainsMatcher::new(&needle.to_uppercase());
            let lower = ContainsMatcher::new(&needle.to_lowercase());
            prop_assert_eq!(upper.matches(Some(&hay)), lower.matches(Some(&hay)));
        }

        #[test]
        fn prop_value_always_contains_itself(value in "[a-zA-Z0-9 ]{0,30}") {
            prop_assert!(ContainsMatcher::new(&value).matches(Some(&value)));
        }
    }
}
