//! Step checks for the booking flow.
//!
//! Every check returns the line to report on success and
//! [`Error::CheckFailed`] describing what was expected otherwise.

use crate::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "12 Mar", "3 Sept"
    static ref DATE_PATTERN: Regex = Regex::new(r"\d{1,2} \w{3}").unwrap();
}

/// The main document answered with `expected`.
pub fn status_is(actual: Option<u16>, expected: u16) -> Result<String> {
    match actual {
        Some(code) if code == expected => Ok(format!("HTTP status code is {}", code)),
        Some(code) => Err(Error::CheckFailed(format!(
            "Expected status {}, but got {}",
            expected, code
        ))),
        None => Err(Error::CheckFailed(format!(
            "Expected status {}, but no document response was observed",
            expected
        ))),
    }
}

/// `actual` contains `expected`.
pub fn contains(label: &str, actual: &str, expected: &str) -> Result<String> {
    if actual.contains(expected) {
        Ok(format!("{} contains: '{}'", label, actual))
    } else {
        Err(Error::CheckFailed(format!(
            "Expected '{}' in {}, but got '{}'",
            expected, label, actual
        )))
    }
}

/// The page title contains `expected`.
pub fn title_contains(title: &str, expected: &str) -> Result<String> {
    if title.contains(expected) {
        Ok(format!("Page title is correct: '{}'", title))
    } else {
        Err(Error::CheckFailed(format!(
            "Expected title containing '{}', but got '{}'",
            expected, title
        )))
    }
}

/// `text` shows a day and abbreviated month.
pub fn has_date(label: &str, text: &str) -> Result<String> {
    if DATE_PATTERN.is_match(text) {
        Ok(format!("{} has a date: '{}'", label, one_line(text)))
    } else {
        Err(Error::CheckFailed(format!(
            "{} text does not contain a date: '{}'",
            label,
            one_line(text)
        )))
    }
}

/// The passenger summary shows `adults` adults.
pub fn adult_count(text: &str, adults: usize) -> Result<String> {
    contains("Passengers button", &one_line(text), &format!("{} Adult", adults))
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
