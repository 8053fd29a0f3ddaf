// In-memory stand-in for the Postfix REST Server used by the service tests.
//
// Records live under their item path (`/domains/x.com/accounts/jdoe`) and
// remember the collection they were created in. Every call is recorded, and
// a call can be made to fail with a given HTTP status.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::transport::{ResourcePath, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub ok: bool,
}

struct Record {
    collection: String,
    value: Value,
}

#[derive(Default)]
pub struct FakeServer {
    records: RefCell<BTreeMap<String, Record>>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<BTreeMap<usize, u16>>,
    next_id: Cell<i64>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `index`-th call (0-based, counting every call) fail.
    pub fn fail_call(&self, index: usize, status: u16) {
        self.failures.borrow_mut().insert(index, status);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Bodies of the PUT requests sent so far, in order.
    pub fn updates(&self) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.method == Method::Put)
            .filter_map(|c| c.body.clone())
            .collect()
    }

    /// Store a record directly, bypassing the call log.
    pub fn seed(&self, collection: &str, value: Value) {
        let value = self.stamp(value);
        let path = item_path(collection, &value);
        self.records.borrow_mut().insert(
            path,
            Record {
                collection: collection.to_string(),
                value,
            },
        );
    }

    pub fn record(&self, path: &str) -> Option<Value> {
        self.records.borrow().get(path).map(|r| r.value.clone())
    }

    fn stamp(&self, mut value: Value) -> Value {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        if let Value::Object(map) = &mut value {
            map.remove("password");
            map.remove("confirmPassword");
            map.entry("id").or_insert(json!(id));
            map.entry("enabled").or_insert(json!(true));
            map.entry("created").or_insert(json!("2020-01-01T00:00:00Z"));
            map.entry("updated").or_insert(json!("2020-01-01T00:00:00Z"));
        }
        value
    }

    fn begin(&self, method: Method, path: &ResourcePath, body: Option<&Value>) -> Result<()> {
        // rejected before anything is sent, like the HTTP transport
        path.check()?;
        let index = self.call_count();
        let failure = self.failures.borrow().get(&index).copied();
        self.calls.borrow_mut().push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
            ok: failure.is_none(),
        });
        match failure {
            Some(status) => Err(api_error(status, "injected failure")),
            None => Ok(()),
        }
    }

    fn mark_failed(&self) {
        if let Some(last) = self.calls.borrow_mut().last_mut() {
            last.ok = false;
        }
    }

    fn not_found(&self, path: &str) -> Error {
        self.mark_failed();
        api_error(404, &format!("{path} not found"))
    }
}

impl Transport for FakeServer {
    fn get(&self, path: &ResourcePath) -> Result<Value> {
        self.begin(Method::Get, path, None)?;
        let key = path.to_string();
        let records = self.records.borrow();
        if let Some(record) = records.get(&key) {
            return Ok(record.value.clone());
        }

        // A collection, or every item below a prefix of one (alias recipients).
        let prefix = format!("{key}/");
        let items: Vec<Value> = records
            .iter()
            .filter(|(p, r)| {
                r.collection == key || (p.starts_with(&prefix) && key.starts_with(&r.collection))
            })
            .map(|(_, r)| r.value.clone())
            .collect();
        let is_collection = matches!(
            path.segments().last().map(String::as_str),
            Some("domains" | "accounts" | "aliases")
        );
        if items.is_empty() && !is_collection {
            drop(records);
            return Err(self.not_found(&key));
        }
        Ok(Value::Array(items))
    }

    fn post(&self, path: &ResourcePath, body: &Value) -> Result<Value> {
        self.begin(Method::Post, path, Some(body))?;
        let collection = path.to_string();
        let value = self.stamp(body.clone());
        let item = item_path(&collection, &value);
        if self.records.borrow().contains_key(&item) {
            self.mark_failed();
            return Err(api_error(409, &format!("{item} already exists")));
        }
        self.records.borrow_mut().insert(
            item,
            Record {
                collection,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    fn put(&self, path: &ResourcePath, body: &Value) -> Result<Value> {
        self.begin(Method::Put, path, Some(body))?;
        let key = path.to_string();
        let Some(mut record) = self.records.borrow_mut().remove(&key) else {
            return Err(self.not_found(&key));
        };
        if let (Value::Object(stored), Value::Object(changes)) = (&mut record.value, body) {
            merge(stored, changes);
        }
        let value = record.value.clone();
        let item = item_path(&record.collection, &value);
        self.records.borrow_mut().insert(item, record);
        Ok(value)
    }

    fn delete(&self, path: &ResourcePath) -> Result<()> {
        self.begin(Method::Delete, path, None)?;
        let key = path.to_string();
        if self.records.borrow_mut().remove(&key).is_none() {
            return Err(self.not_found(&key));
        }
        Ok(())
    }
}

/// Fields present in an update replace the stored ones; absent fields stay.
fn merge(stored: &mut Map<String, Value>, changes: &Map<String, Value>) {
    for (k, v) in changes {
        if k == "password" || k == "confirmPassword" {
            continue;
        }
        stored.insert(k.clone(), v.clone());
    }
}

fn item_path(collection: &str, value: &Value) -> String {
    let field = |name: &str| value.get(name).and_then(Value::as_str).unwrap_or_default();
    match collection.rsplit('/').next() {
        Some("domains") => format!("{collection}/{}", field("name")),
        Some("accounts") => format!("{collection}/{}", field("username")),
        Some("aliases") => format!("{collection}/{}/{}", field("name"), field("email")),
        // BCC rules are singletons addressed by their collection path
        _ => collection.to_string(),
    }
}

fn api_error(status: u16, message: &str) -> Error {
    Error::Api {
        status,
        message: message.to_string(),
    }
}
