//! Result-count validation for functional tests.
//!
//! One policy, applied by every discrete test:
//!
//! | results vs expected                  | outcome | counted in perf? |
//! |--------------------------------------|---------|------------------|
//! | no expectation, results > 0          | pass    | yes              |
//! | no expectation, results == 0         | fail    | no               |
//! | results == expected                  | pass    | yes              |
//! | results == 0, expectation set        | fail    | no               |
//! | results > expected                   | fail    | no               |
//! | 0 < results < expected               | pass NA | no               |
//!
//! The NA soft pass exists so a benchmark run does not flake when the seed
//! dataset is smaller than the requested limit. It counts as passed but is
//! excluded from performance aggregation and the mode-comparison table.

use serde::{Deserialize, Serialize};

/// Soft-pass status marker for insufficient seed data.
pub const STATUS_NA: &str = "NA";

/// Outcome of validating a result count against an expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountValidation {
    pub passed: bool,
    /// Whether this run may feed performance aggregation.
    pub countable: bool,
    /// `Some(STATUS_NA)` for the soft pass, `Some(message)` on failure,
    /// `None` on a clean pass.
    pub status: Option<String>,
}

impl CountValidation {
    fn pass() -> Self {
        Self {
            passed: true,
            countable: true,
            status: None,
        }
    }

    fn pass_na() -> Self {
        Self {
            passed: true,
            countable: false,
            status: Some(STATUS_NA.to_string()),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            countable: false,
            status: Some(message.into()),
        }
    }

    pub fn is_na(&self) -> bool {
        self.status.as_deref() == Some(STATUS_NA)
    }
}

/// Apply the result-count policy.
pub fn validate_result_count(results_count: usize, expected: Option<usize>) -> CountValidation {
    let Some(expected) = expected else {
        return if results_count > 0 {
            CountValidation::pass()
        } else {
            CountValidation::fail("no results found")
        };
    };

    if results_count == expected {
        CountValidation::pass()
    } else if results_count == 0 {
        CountValidation::fail(format!("expected {expected} results, got 0"))
    } else if results_count > expected {
        CountValidation::fail(format!(
            "expected {expected} results, got {results_count} (limit not enforced)"
        ))
    } else {
        // Fewer than expected but non-zero: insufficient seed data.
        CountValidation::pass_na()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_expectation_passes_on_any_results() {
        let v = validate_result_count(7, None);
        assert!(v.passed && v.countable && v.status.is_none());
    }

    #[test]
    fn unspecified_expectation_fails_on_zero() {
        let v = validate_result_count(0, None);
        assert!(!v.passed && !v.countable);
    }

    #[test]
    fn exact_match_passes_and_counts() {
        let v = validate_result_count(500, Some(500));
        assert!(v.passed && v.countable);
    }

    #[test]
    fn zero_with_expectation_fails() {
        let v = validate_result_count(0, Some(100));
        assert!(!v.passed);
        assert_eq!(v.status.as_deref(), Some("expected 100 results, got 0"));
    }

    #[test]
    fn overshoot_reports_limit_not_enforced() {
        let v = validate_result_count(600, Some(500));
        assert!(!v.passed && !v.countable);
        assert!(v.status.as_deref().unwrap().contains("limit not enforced"));
    }

    #[test]
    fn undershoot_is_a_soft_na_pass() {
        let v = validate_result_count(12, Some(500));
        assert!(v.passed);
        assert!(!v.countable);
        assert!(v.is_na());
    }
}
