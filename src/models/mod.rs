//! Record types for the account databases.

pub mod group;
pub mod user;

use crate::error::{Error, Result};

/// Reject values carrying the field separator of the underlying files.
pub(crate) fn check_colon(field: &'static str, value: &str) -> Result<()> {
    if value.contains(':') {
        return Err(Error::ColonInValue {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Parse a numeric field from caller-supplied text, strictly.
pub(crate) fn parse_num<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
