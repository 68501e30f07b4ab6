//! Table name validation.
//!
//! Valid table names:
//! - Must be non-empty and consist of ASCII letters and digits only
//! - Must not end with the link suffix (those names are reserved for
//!   reference fields)
//! - Must not start with a digit
//!
//! Rules are applied in that order and the first violated rule is reported.

use std::fmt;

use crate::error::TypeError;

/// A table-naming rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NameRule {
    /// Empty, or contains something other than ASCII letters and digits.
    NotAlphanumeric,
    /// Ends with the suffix that marks reference fields.
    ReservedSuffix,
    /// Starts with a digit.
    LeadingDigit,
}

impl fmt::Display for NameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAlphanumeric => write!(f, "must be non-empty and alphanumeric"),
            Self::ReservedSuffix => write!(f, "must not end with the link suffix"),
            Self::LeadingDigit => write!(f, "must not start with a digit"),
        }
    }
}

/// Validate a table name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use reltab_types::names::{validate_table_name, NameRule};
/// use reltab_types::TypeError;
///
/// assert!(validate_table_name("users", "Hash").is_ok());
/// assert!(matches!(
///     validate_table_name("userHash", "Hash"),
///     Err(TypeError::InvalidTableName { rule: NameRule::ReservedSuffix, .. })
/// ));
/// ```
pub fn validate_table_name(name: &str, link_suffix: &str) -> Result<(), TypeError> {
    let fail = |rule| {
        Err(TypeError::InvalidTableName {
            name: name.to_string(),
            rule,
        })
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return fail(NameRule::NotAlphanumeric);
    }
    if !link_suffix.is_empty() && name.ends_with(link_suffix) {
        return fail(NameRule::ReservedSuffix);
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return fail(NameRule::LeadingDigit);
    }
    Ok(())
}

/// Validate every name in order, stopping at the first invalid one.
pub fn validate_table_names<I, S>(names: I, link_suffix: &str) -> Result<(), TypeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .try_for_each(|name| validate_table_name(name.as_ref(), link_suffix))
}
