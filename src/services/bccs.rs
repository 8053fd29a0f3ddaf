// Per-account BCC rules. Sender and recipient rules share one service and
// differ only in the path segment they live under.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::Result;
use crate::model::Bcc;
use crate::transport::{ResourcePath, Transport};
use crate::validate::{validate_address, validate_email};

/// Which BCC namespace of an account a service addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BccKind {
    /// Copies of mail received by the account (recipient BCC).
    Incoming,
    /// Copies of mail sent by the account (sender BCC).
    Outgoing,
}

impl BccKind {
    fn segment(self) -> &'static str {
        match self {
            BccKind::Incoming => "incoming",
            BccKind::Outgoing => "outgoing",
        }
    }
}

impl fmt::Display for BccKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

#[derive(Debug, Default, Serialize)]
struct BccUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
}

/// BCC API for one namespace, fixed at construction. An account has at most
/// one rule per namespace, so rules are keyed by (domain, username) alone.
pub struct BccService {
    transport: Rc<dyn Transport>,
    kind: BccKind,
}

impl BccService {
    pub fn new(transport: Rc<dyn Transport>, kind: BccKind) -> Self {
        BccService { transport, kind }
    }

    pub fn kind(&self) -> BccKind {
        self.kind
    }

    pub fn get(&self, domain: &str, username: &str) -> Result<Bcc> {
        validate_address(username, domain)?;
        self.fetch(domain, username)
    }

    /// Copy mail of `username@domain` to `email`.
    pub fn create(&self, domain: &str, username: &str, email: &str) -> Result<()> {
        validate_address(username, domain)?;
        validate_email(email)?;
        self.transport
            .post(&self.path(domain, username), &json!({ "email": email }))?;
        info!(kind = %self.kind, account = %format!("{username}@{domain}"), recipient = email, "bcc created");
        Ok(())
    }

    pub fn delete(&self, domain: &str, username: &str) -> Result<()> {
        validate_address(username, domain)?;
        self.transport.delete(&self.path(domain, username))?;
        info!(kind = %self.kind, account = %format!("{username}@{domain}"), "bcc deleted");
        Ok(())
    }

    pub fn enable(&self, domain: &str, username: &str) -> Result<()> {
        self.set_enabled(domain, username, true)
    }

    pub fn disable(&self, domain: &str, username: &str) -> Result<()> {
        self.set_enabled(domain, username, false)
    }

    /// Point the rule at a new recipient, keeping its enabled state.
    pub fn change_recipient(&self, domain: &str, username: &str, email: &str) -> Result<()> {
        validate_address(username, domain)?;
        validate_email(email)?;
        let current = self.fetch(domain, username)?;
        self.update(
            domain,
            username,
            BccUpdate {
                email: Some(email),
                enabled: Some(current.enabled),
            },
        )
    }

    fn set_enabled(&self, domain: &str, username: &str, enabled: bool) -> Result<()> {
        validate_address(username, domain)?;
        self.update(
            domain,
            username,
            BccUpdate {
                enabled: Some(enabled),
                ..Default::default()
            },
        )
    }

    fn update(&self, domain: &str, username: &str, update: BccUpdate<'_>) -> Result<()> {
        self.transport
            .put(&self.path(domain, username), &serde_json::to_value(&update)?)?;
        info!(kind = %self.kind, account = %format!("{username}@{domain}"), "bcc updated");
        Ok(())
    }

    fn fetch(&self, domain: &str, username: &str) -> Result<Bcc> {
        let value = self.transport.get(&self.path(domain, username))?;
        Ok(serde_json::from_value(value)?)
    }

    fn path(&self, domain: &str, username: &str) -> ResourcePath {
        ResourcePath::new("domains")
            .join(domain)
            .join("accounts")
            .join(username)
            .join("bccs")
            .join(self.kind.segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_utils::{FakeServer, Method};

    const INCOMING: &str = "/domains/x.com/accounts/jdoe/bccs/incoming";
    const OUTGOING: &str = "/domains/x.com/accounts/jdoe/bccs/outgoing";

    fn services() -> (Rc<FakeServer>, BccService, BccService) {
        let server = Rc::new(FakeServer::new());
        (
            server.clone(),
            BccService::new(server.clone(), BccKind::Incoming),
            BccService::new(server, BccKind::Outgoing),
        )
    }

    #[test]
    fn kinds_address_separate_namespaces() {
        let (server, incoming, outgoing) = services();
        incoming.create("x.com", "jdoe", "archive@x.com").unwrap();
        outgoing.create("x.com", "jdoe", "audit@x.com").unwrap();

        let calls = server.calls();
        assert_eq!(calls[0].path, INCOMING);
        assert_eq!(calls[1].path, OUTGOING);
        assert_eq!(incoming.get("x.com", "jdoe").unwrap().email, "archive@x.com");
        assert_eq!(outgoing.get("x.com", "jdoe").unwrap().email, "audit@x.com");

        outgoing.delete("x.com", "jdoe").unwrap();
        assert!(incoming.get("x.com", "jdoe").is_ok());
        assert!(matches!(
            outgoing.get("x.com", "jdoe"),
            Err(Error::Api { status: 404, .. })
        ));
    }

    #[test]
    fn both_addresses_validated_before_calls() {
        let (server, incoming, outgoing) = services();
        assert!(incoming.create("x.com", "jdoe@@", "archive@x.com").is_err());
        assert!(incoming.create("x.com", "jdoe", "archive").is_err());
        assert!(outgoing.change_recipient("x.com", "jdoe", "@x.com").is_err());
        assert!(outgoing.change_recipient("x.com", "j doe", "a@x.com").is_err());
        assert!(outgoing.enable("x.com", "").is_err());
        assert_eq!(server.call_count(), 0);
    }

    #[test]
    fn toggles_send_only_the_flag() {
        let (server, incoming, _) = services();
        server.seed(INCOMING, json!({"email": "archive@x.com"}));

        incoming.disable("x.com", "jdoe").unwrap();
        incoming.enable("x.com", "jdoe").unwrap();

        assert_eq!(
            server.updates(),
            vec![json!({"enabled": false}), json!({"enabled": true})]
        );
        assert_eq!(incoming.get("x.com", "jdoe").unwrap().email, "archive@x.com");
    }

    #[test]
    fn change_recipient_keeps_enabled_state() {
        let (server, _, outgoing) = services();
        server.seed(OUTGOING, json!({"email": "old@x.com", "enabled": false}));

        outgoing.change_recipient("x.com", "jdoe", "new@x.com").unwrap();

        let calls = server.calls();
        assert_eq!(calls[0].method, Method::Get);
        assert_eq!(calls[1].method, Method::Put);
        assert_eq!(
            calls[1].body.as_ref().unwrap(),
            &json!({"email": "new@x.com", "enabled": false})
        );
        let bcc = outgoing.get("x.com", "jdoe").unwrap();
        assert_eq!((bcc.email.as_str(), bcc.enabled), ("new@x.com", false));
    }
}
