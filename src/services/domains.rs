// Domain API: `/domains` and `/domains/{name}`. Enable, disable and rename
// are partial updates of the same record.

use std::rc::Rc;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::Result;
use crate::model::Domain;
use crate::transport::{ResourcePath, Transport};

/// Partial update: omitted fields are left unchanged by the server.
#[derive(Debug, Default, Serialize)]
struct DomainUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
}

/// Domain API. Domain names are bare names, so nothing is validated locally.
pub struct DomainService {
    transport: Rc<dyn Transport>,
}

impl DomainService {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        DomainService { transport }
    }

    pub fn list(&self) -> Result<Vec<Domain>> {
        let value = self.transport.get(&collection())?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn get(&self, name: &str) -> Result<Domain> {
        let value = self.transport.get(&item(name))?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn create(&self, name: &str) -> Result<()> {
        self.transport.post(&collection(), &json!({ "name": name }))?;
        info!(domain = name, "domain created");
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.transport.delete(&item(name))?;
        info!(domain = name, "domain deleted");
        Ok(())
    }

    /// Rename `old` to `new`. Only the name is sent, so the enabled state is kept.
    pub fn rename(&self, old: &str, new: &str) -> Result<()> {
        self.update(
            old,
            DomainUpdate {
                name: Some(new),
                ..Default::default()
            },
        )
    }

    pub fn enable(&self, name: &str) -> Result<()> {
        self.set_enabled(name, true)
    }

    pub fn disable(&self, name: &str) -> Result<()> {
        self.set_enabled(name, false)
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        self.update(
            name,
            DomainUpdate {
                name: Some(name),
                enabled: Some(enabled),
            },
        )
    }

    fn update(&self, name: &str, update: DomainUpdate<'_>) -> Result<()> {
        self.transport
            .put(&item(name), &serde_json::to_value(&update)?)?;
        info!(domain = name, "domain updated");
        Ok(())
    }
}

fn collection() -> ResourcePath {
    ResourcePath::new("domains")
}

fn item(name: &str) -> ResourcePath {
    collection().join(name)
}
