// Client: one object holding every resource service, built once at startup
// from the configuration. All services share the same transport through an
// `Rc`; the session is read-only for the life of the process.

use std::rc::Rc;

use crate::config::Config;
use crate::error::Result;
use crate::services::{AccountService, AliasService, AuthService, BccKind, BccService, DomainService};
use crate::transport::{HttpTransport, Session, Transport};

pub struct Client {
    session: Session,
    pub auth: AuthService,
    pub domains: DomainService,
    pub accounts: AccountService,
    pub aliases: AliasService,
    /// Recipient (incoming mail) BCC rules.
    pub input_bccs: BccService,
    /// Sender (outgoing mail) BCC rules.
    pub output_bccs: BccService,
}

impl Client {
    /// Create a client talking HTTP to the server named in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let session = transport.session().clone();
        Ok(Self::with_transport(Rc::new(transport), session))
    }

    /// Create a client on top of any transport.
    pub fn with_transport(transport: Rc<dyn Transport>, session: Session) -> Self {
        Client {
            session,
            auth: AuthService::new(transport.clone()),
            domains: DomainService::new(transport.clone()),
            accounts: AccountService::new(transport.clone()),
            aliases: AliasService::new(transport.clone()),
            input_bccs: BccService::new(transport.clone(), BccKind::Incoming),
            output_bccs: BccService::new(transport, BccKind::Outgoing),
        }
    }

    /// The BCC service for `kind`.
    pub fn bccs(&self, kind: BccKind) -> &BccService {
        match kind {
            BccKind::Incoming => &self.input_bccs,
            BccKind::Outgoing => &self.output_bccs,
        }
    }

    pub fn login(&self) -> &str {
        &self.session.login
    }

    pub fn auth_token(&self) -> &str {
        &self.session.auth_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.session.refresh_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeServer;
    use serde_json::json;

    #[test]
    fn services_share_one_transport() {
        let server = Rc::new(FakeServer::new());
        let client = Client::with_transport(server.clone(), Session::default());

        client.domains.create("x.com").unwrap();
        client.accounts.create("x.com", "jdoe", "pw").unwrap();
        client.aliases.create("x.com", "sales", "jdoe@x.com").unwrap();
        client.bccs(BccKind::Outgoing).create("x.com", "jdoe", "audit@x.com").unwrap();

        assert_eq!(server.call_count(), 4);
        assert!(server.record("/domains/x.com").is_some());
        assert_eq!(
            server.record("/domains/x.com/accounts/jdoe/bccs/outgoing").unwrap()["email"],
            json!("audit@x.com")
        );
        assert_eq!(client.bccs(BccKind::Incoming).kind(), BccKind::Incoming);
    }

    #[test]
    fn exposes_session_from_config() {
        let config = Config {
            login: "admin@x.com".into(),
            auth_token: "tok".into(),
            refresh_token: "ref".into(),
            ..Config::default()
        };
        let client = Client::new(&config).unwrap();
        assert_eq!(client.login(), "admin@x.com");
        assert_eq!(client.auth_token(), "tok");
        assert_eq!(client.refresh_token(), "ref");
    }
}
