// Account API under `/domains/{domain}/accounts`. Every call that names an
// account checks `username@domain` locally first.

use std::rc::Rc;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::model::Account;
use crate::transport::{ResourcePath, Transport};
use crate::validate::validate_address;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountCreate<'a> {
    username: &'a str,
    password: &'a str,
    confirm_password: &'a str,
}

/// Partial update: only the fields that are set are sent.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirm_password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
}

/// Account API. Every call naming a user checks `user@domain` before
/// anything is sent to the server.
pub struct AccountService {
    transport: Rc<dyn Transport>,
}

impl AccountService {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        AccountService { transport }
    }

    /// All accounts of `domain`.
    pub fn list(&self, domain: &str) -> Result<Vec<Account>> {
        let value = self.transport.get(&collection(domain))?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn get(&self, domain: &str, username: &str) -> Result<Account> {
        validate_address(username, domain)?;
        let value = self.transport.get(&item(domain, username))?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn create(&self, domain: &str, username: &str, password: &str) -> Result<()> {
        validate_address(username, domain)?;
        let body = AccountCreate {
            username,
            password,
            confirm_password: password,
        };
        self.transport
            .post(&collection(domain), &serde_json::to_value(&body)?)?;
        info!(account = %format!("{username}@{domain}"), "account created");
        Ok(())
    }

    pub fn delete(&self, domain: &str, username: &str) -> Result<()> {
        validate_address(username, domain)?;
        self.transport.delete(&item(domain, username))?;
        info!(account = %format!("{username}@{domain}"), "account deleted");
        Ok(())
    }

    pub fn enable(&self, domain: &str, username: &str) -> Result<()> {
        self.set_enabled(domain, username, true)
    }

    pub fn disable(&self, domain: &str, username: &str) -> Result<()> {
        self.set_enabled(domain, username, false)
    }

    /// Change the username from `old` to `new`. Both names are validated
    /// before the update is sent.
    pub fn rename(&self, domain: &str, old: &str, new: &str) -> Result<()> {
        for username in [old, new] {
            validate_address(username, domain)?;
        }
        self.update(
            domain,
            old,
            AccountUpdate {
                username: Some(new),
                ..Default::default()
            },
        )
    }

    pub fn change_password(&self, domain: &str, username: &str, password: &str) -> Result<()> {
        validate_address(username, domain)?;
        self.update(
            domain,
            username,
            AccountUpdate {
                password: Some(password),
                confirm_password: Some(password),
                ..Default::default()
            },
        )
    }

    fn set_enabled(&self, domain: &str, username: &str, enabled: bool) -> Result<()> {
        validate_address(username, domain)?;
        self.update(
            domain,
            username,
            AccountUpdate {
                enabled: Some(enabled),
                ..Default::default()
            },
        )
    }

    fn update(&self, domain: &str, username: &str, update: AccountUpdate<'_>) -> Result<()> {
        self.transport
            .put(&item(domain, username), &serde_json::to_value(&update)?)?;
        info!(account = %format!("{username}@{domain}"), "account updated");
        Ok(())
    }
}

fn collection(domain: &str) -> ResourcePath {
    ResourcePath::new("domains").join(domain).join("accounts")
}

fn item(domain: &str, username: &str) -> ResourcePath {
    collection(domain).join(username)
}
