//! Shared helpers for command handlers.

use billdesk_core::{CoreError, Msisdn, parse_amount};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse a subscriber number argument.
pub fn msisdn(field: &str, raw: &str) -> Result<Msisdn, CliError> {
    Msisdn::parse(raw).map_err(|e| match e {
        CoreError::ValidationFailed { message, .. } => CliError::Validation {
            field: field.into(),
            reason: message,
        },
        other => other.into(),
    })
}

/// Parse a money argument.
pub fn amount(field: &str, raw: &str) -> Result<f64, CliError> {
    Ok(parse_amount(field, raw)?)
}

/// `Some(x)` rendered, `None` as an empty cell.
pub fn opt<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msisdn_errors_name_the_argument() {
        match msisdn("from", "07x") {
            Err(CliError::Validation { field, .. }) => assert_eq!(field, "from"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn amount_rejects_negative_values() {
        assert!(matches!(
            amount("balance", "-1"),
            Err(CliError::Validation { .. })
        ));
        assert!(matches!(amount("balance", "12.5"), Ok(v) if (v - 12.5).abs() < f64::EPSILON));
    }

    #[test]
    fn opt_renders_empty_for_none() {
        assert_eq!(opt::<i64>(None), "");
        assert_eq!(opt(Some(&7)), "7");
    }
}
