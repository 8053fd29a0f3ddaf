// Transport module: the only place that talks HTTP. It contains a small
// blocking client for the Postfix REST Server and the `Transport` trait the
// resource services are written against, so they can be exercised without a
// server.

use std::fmt;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::version::Version;

/// Path of a resource relative to the API root, kept as raw segments.
/// Segments are percent-encoded only when the URL is built, so usernames and
/// addresses can be passed as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath(Vec<String>);

impl ResourcePath {
    pub fn new(segment: impl Into<String>) -> Self {
        ResourcePath(vec![segment.into()])
    }

    /// Append one segment.
    pub fn join(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Every segment must name exactly one path component. The URL builder
    /// drops `.` and `..`, which would silently address the parent resource.
    pub fn check(&self) -> Result<()> {
        match self
            .0
            .iter()
            .find(|s| s.is_empty() || *s == "." || *s == "..")
        {
            Some(bad) => Err(Error::InvalidPath(bad.clone())),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// The capability the resource services need from the server: plain
/// List/Get/Create/Update/Delete requests against a named resource.
///
/// Bodies travel as `serde_json::Value`; services own the typed payloads.
pub trait Transport {
    fn get(&self, path: &ResourcePath) -> Result<Value>;
    fn post(&self, path: &ResourcePath, body: &Value) -> Result<Value>;
    fn put(&self, path: &ResourcePath, body: &Value) -> Result<Value>;
    fn delete(&self, path: &ResourcePath) -> Result<()>;
}

/// Login plus the token pair issued by the server. Set once at startup from
/// the credential cache and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub login: String,
    pub auth_token: String,
    pub refresh_token: String,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        !self.auth_token.is_empty()
    }
}

/// Blocking HTTP transport holding a reqwest client, the API root URL and the
/// session used for authenticated calls.
pub struct HttpTransport {
    client: Client,
    api_root: Url,
    session: Session,
}

impl HttpTransport {
    /// Build a transport from the immutable startup configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let api_root = Url::parse(&format!("{}/api/v1", config.base_url()))
            .map_err(|e| Error::Config(format!("invalid server address: {e}")))?;
        let client = Client::builder()
            .user_agent(format!("emailctl/{}", Version::current()))
            .build()?;
        Ok(HttpTransport {
            client,
            api_root,
            session: config.session(),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &ResourcePath) -> Result<Url> {
        path.check()?;
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("'{}' cannot be used as a base URL", self.api_root)))?
            .pop_if_empty()
            .extend(path.segments());
        Ok(url)
    }

    /// Authorization header for the current session, if there is one.
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if self.session.is_authenticated() {
            match HeaderValue::from_str(&format!("Bearer {}", self.session.auth_token)) {
                Ok(val) => {
                    headers.insert(AUTHORIZATION, val);
                }
                Err(_) => warn!("stored auth token is not a valid header value, sending request without it"),
            }
        }
        headers
    }

    fn send(&self, method: Method, path: &ResourcePath, body: Option<&Value>) -> Result<Value> {
        let url = self.url(path)?;
        debug!(%method, %url, "sending request");

        let mut req = self
            .client
            .request(method, url)
            .headers(self.auth_headers());
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send()?;
        let status = res.status();
        debug!(%status, "response received");

        let text = res.text()?;
        decode_response(status, &text)
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &ResourcePath) -> Result<Value> {
        self.send(Method::GET, path, None)
    }

    fn post(&self, path: &ResourcePath, body: &Value) -> Result<Value> {
        self.send(Method::POST, path, Some(body))
    }

    fn put(&self, path: &ResourcePath, body: &Value) -> Result<Value> {
        self.send(Method::PUT, path, Some(body))
    }

    fn delete(&self, path: &ResourcePath) -> Result<()> {
        self.send(Method::DELETE, path, None).map(|_| ())
    }
}

/// Turn a status and body into the call result: non-2xx statuses become
/// `Error::Api`, an empty success body is `Value::Null`.
fn decode_response(status: StatusCode, body: &str) -> Result<Value> {
    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: error_message(status, body),
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

/// Pick a readable message out of an error response. The server reports
/// errors as JSON with a `message` field; anything else is used verbatim.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = map.get("message") {
            if !message.is_empty() {
                return message.clone();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        body.to_string()
    }
}
