// Alias API. An alias name can forward to several recipients; each
// (alias, recipient) mapping is its own resource on the server under
// `/domains/{domain}/aliases/{alias}/{email}`.
//
// `delete_all` and `rename_all` fetch the recipient list and then send one
// request per recipient. The server has no transactions: the first failure
// is returned as-is and the mappings handled before it stay changed.

use std::rc::Rc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::Result;
use crate::model::Alias;
use crate::transport::{ResourcePath, Transport};
use crate::validate::{validate_address, validate_email};

/// Mapping updates always carry the full triple.
#[derive(Debug, Serialize)]
struct AliasUpdate<'a> {
    name: &'a str,
    email: &'a str,
    enabled: bool,
}

pub struct AliasService {
    transport: Rc<dyn Transport>,
}

impl AliasService {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        AliasService { transport }
    }

    /// Every mapping of every alias in `domain`.
    pub fn list(&self, domain: &str) -> Result<Vec<Alias>> {
        let value = self.transport.get(&collection(domain))?;
        Ok(serde_json::from_value(value)?)
    }

    /// All recipient mappings of `alias`.
    pub fn get(&self, domain: &str, alias: &str) -> Result<Vec<Alias>> {
        validate_address(alias, domain)?;
        self.recipients(domain, alias)
    }

    /// The single mapping of `alias` to `email`.
    pub fn get_for_email(&self, domain: &str, alias: &str, email: &str) -> Result<Alias> {
        validate_address(alias, domain)?;
        validate_email(email)?;
        self.mapping(domain, alias, email)
    }

    pub fn create(&self, domain: &str, alias: &str, email: &str) -> Result<()> {
        validate_address(alias, domain)?;
        validate_email(email)?;
        self.transport
            .post(&collection(domain), &json!({ "name": alias, "email": email }))?;
        info!(alias = %format!("{alias}@{domain}"), recipient = email, "alias created");
        Ok(())
    }

    /// Remove the mapping of `alias` to `email`.
    pub fn delete(&self, domain: &str, alias: &str, email: &str) -> Result<()> {
        validate_address(alias, domain)?;
        validate_email(email)?;
        self.transport.delete(&item(domain, alias, email))?;
        info!(alias = %format!("{alias}@{domain}"), recipient = email, "alias deleted");
        Ok(())
    }

    /// Remove every mapping of `alias`, returning how many were removed.
    pub fn delete_all(&self, domain: &str, alias: &str) -> Result<usize> {
        validate_address(alias, domain)?;
        let recipients = self.recipients(domain, alias)?;
        let total = recipients.len();
        for (done, mapping) in recipients.iter().enumerate() {
            if let Err(e) = self.transport.delete(&item(domain, alias, &mapping.email)) {
                report_partial("delete", alias, domain, done, total);
                return Err(e);
            }
        }
        info!(alias = %format!("{alias}@{domain}"), count = total, "alias deleted");
        Ok(total)
    }

    pub fn enable(&self, domain: &str, alias: &str, email: &str) -> Result<()> {
        self.set_enabled(domain, alias, email, true)
    }

    pub fn disable(&self, domain: &str, alias: &str, email: &str) -> Result<()> {
        self.set_enabled(domain, alias, email, false)
    }

    /// Rename the mapping of `alias` to `email`; other recipients of `alias`
    /// keep the old name.
    pub fn rename(&self, domain: &str, alias: &str, email: &str, new_name: &str) -> Result<Alias> {
        validate_address(alias, domain)?;
        validate_email(email)?;
        validate_address(new_name, domain)?;
        let current = self.mapping(domain, alias, email)?;
        self.rename_mapping(domain, current, new_name)
    }

    /// Rename every mapping of `alias` to `new_name`, returning the renamed
    /// mappings.
    pub fn rename_all(&self, domain: &str, alias: &str, new_name: &str) -> Result<Vec<Alias>> {
        validate_address(alias, domain)?;
        validate_address(new_name, domain)?;
        let recipients = self.recipients(domain, alias)?;
        let total = recipients.len();
        let mut renamed = Vec::with_capacity(total);
        for mapping in recipients {
            match self.rename_mapping(domain, mapping, new_name) {
                Ok(mapping) => renamed.push(mapping),
                Err(e) => {
                    report_partial("rename", alias, domain, renamed.len(), total);
                    return Err(e);
                }
            }
        }
        Ok(renamed)
    }

    // The per-recipient update needs the full triple, so the current mapping
    // is read first and its email sent back unchanged.
    fn set_enabled(&self, domain: &str, alias: &str, email: &str, enabled: bool) -> Result<()> {
        validate_address(alias, domain)?;
        validate_email(email)?;
        let current = self.mapping(domain, alias, email)?;
        self.update(
            domain,
            &current,
            AliasUpdate {
                name: &current.name,
                email: &current.email,
                enabled,
            },
        )
    }

    fn rename_mapping(&self, domain: &str, current: Alias, new_name: &str) -> Result<Alias> {
        self.update(
            domain,
            &current,
            AliasUpdate {
                name: new_name,
                email: &current.email,
                enabled: current.enabled,
            },
        )?;
        Ok(Alias {
            name: new_name.to_string(),
            ..current
        })
    }

    fn update(&self, domain: &str, current: &Alias, update: AliasUpdate<'_>) -> Result<()> {
        self.transport.put(
            &item(domain, &current.name, &current.email),
            &serde_json::to_value(&update)?,
        )?;
        info!(
            alias = %format!("{}@{domain}", current.name),
            recipient = %current.email,
            "alias updated"
        );
        Ok(())
    }

    fn recipients(&self, domain: &str, alias: &str) -> Result<Vec<Alias>> {
        let value = self.transport.get(&collection(domain).join(alias))?;
        Ok(serde_json::from_value(value)?)
    }

    fn mapping(&self, domain: &str, alias: &str, email: &str) -> Result<Alias> {
        let value = self.transport.get(&item(domain, alias, email))?;
        Ok(serde_json::from_value(value)?)
    }
}

fn report_partial(action: &str, alias: &str, domain: &str, done: usize, total: usize) {
    if done > 0 {
        warn!(
            alias = %format!("{alias}@{domain}"),
            "{action} stopped after {done} of {total} recipients; the rest are unchanged"
        );
    }
}

fn collection(domain: &str) -> ResourcePath {
    ResourcePath::new("domains").join(domain).join("aliases")
}

fn item(domain: &str, alias: &str, email: &str) -> ResourcePath {
    collection(domain).join(alias).join(email)
}
