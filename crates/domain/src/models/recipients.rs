//! Recipient list parsing.

use serde::Deserialize;
use shared::validation::validate_email_address;
use tracing::warn;

/// How a stored comma-separated recipient string becomes a list of addresses.
///
/// The defaults keep the raw comma split untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RecipientPolicy {
    /// Trim whitespace around each address and drop empty entries.
    #[serde(default)]
    pub trim: bool,

    /// Drop entries that are not syntactically valid email addresses.
    #[serde(default)]
    pub validate: bool,
}

/// Splits a stored recipient string according to `policy`.
pub fn split_recipients(raw: &str, policy: RecipientPolicy) -> Vec<String> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = if policy.trim { entry.trim() } else { entry };
            if policy.trim && entry.is_empty() {
                return None;
            }
            if policy.validate {
                if let Err(e) = validate_email_address(entry) {
                    warn!(recipient = %entry, error = %e, "Dropping invalid recipient");
                    return None;
                }
            }
            Some(entry.to_string())
        })
        .collect()
}
