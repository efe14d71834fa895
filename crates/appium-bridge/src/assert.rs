use std::fmt::Display;

use crate::errors::{AppiumError, AppiumResult};

/// Boolean expectation about one subject, e.g. `app com.example` /
/// `to be installed`.
#[derive(Debug, Clone)]
pub(crate) struct Truth {
    subject: String,
    expectation: String,
}

impl Truth {
    pub(crate) fn new(subject: impl Into<String>, expectation: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            expectation: expectation.into(),
        }
    }

    pub(crate) fn assert(self, outcome: bool) -> AppiumResult<()> {
        if outcome {
            Ok(())
        } else {
            Err(AppiumError::assertion(self.subject, self.expectation))
        }
    }

    pub(crate) fn negate(self, outcome: bool) -> AppiumResult<()> {
        if outcome {
            Err(AppiumError::assertion(
                self.subject,
                format!("not {}", self.expectation),
            ))
        } else {
            Ok(())
        }
    }
}

/// Equality check reporting the actual value on mismatch
pub(crate) fn equals<T: PartialEq + Display>(
    subject: &str,
    expected: &T,
    actual: &T,
) -> AppiumResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(AppiumError::assertion(
            subject,
            format!("to be \"{}\", but was \"{}\"", expected, actual),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negated_truth_reads_naturally() {
        let err = Truth::new("device", "to be locked").negate(true).unwrap_err();
        assert_eq!(err.to_string(), "expected device not to be locked");
        assert!(Truth::new("device", "to be locked").assert(true).is_ok());
    }

    #[test]
    fn equality_reports_actual() {
        let err = equals("orientation", &"PORTRAIT", &"LANDSCAPE").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected orientation to be \"PORTRAIT\", but was \"LANDSCAPE\""
        );
        assert_eq!(err.code(), "assertion_failed");
    }
}
