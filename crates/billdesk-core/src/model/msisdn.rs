// ── Subscriber identity ──
//
// The MSISDN is the subscriber primary key throughout the console. Every
// read key and transaction party is an `Msisdn`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Mobile subscriber number, stored trimmed.
///
/// `parse` accepts ASCII digits with an optional leading `+`. Values coming
/// back from the backend are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Msisdn(String);

impl Msisdn {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::invalid("msisdn", "must not be empty"));
        }
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::invalid(
                "msisdn",
                format!("'{trimmed}' is not a phone number"),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Wrap a value reported by the backend without re-validating it.
    pub(crate) fn from_backend(raw: String) -> Self {
        Self(raw.trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Msisdn {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Msisdn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_accepts_digits() {
        let m = Msisdn::parse("  250788000001 ").unwrap();
        assert_eq!(m.as_str(), "250788000001");
    }

    #[test]
    fn accepts_international_prefix() {
        assert!(Msisdn::parse("+250788000001").is_ok());
    }

    #[test]
    fn rejects_empty_and_letters() {
        assert!(Msisdn::parse("   ").is_err());
        assert!(Msisdn::parse("+").is_err());
        assert!(Msisdn::parse("07a8").is_err());
    }
}
