// Address validation used as a precondition guard by the account, alias and
// BCC services. Nothing here touches the network.

use std::str::FromStr;

use email_address::EmailAddress;

use crate::error::{Error, Result};

/// Validate the mailbox built from a local part and a domain (`local@domain`).
pub fn validate_address(local: &str, domain: &str) -> Result<()> {
    validate_email(&format!("{local}@{domain}"))
}

/// Validate a complete email address.
pub fn validate_email(address: &str) -> Result<()> {
    EmailAddress::from_str(address)
        .map(|_| ())
        .map_err(|e| Error::InvalidEmail {
            address: address.to_string(),
            reason: e.to_string(),
        })
}
