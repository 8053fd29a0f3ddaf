// Authentication API: exchanges a login and password for a token pair and
// revokes it again.

use std::rc::Rc;

use serde_json::json;
use tracing::info;

use crate::error::Result;
use crate::model::AuthResponse;
use crate::transport::{ResourcePath, Transport};

/// Sign-in and sign-out against the server's authentication API.
pub struct AuthService {
    transport: Rc<dyn Transport>,
}

impl AuthService {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        AuthService { transport }
    }

    /// Authenticate `login` and return the tokens issued by the server.
    pub fn login(&self, login: &str, password: &str) -> Result<AuthResponse> {
        let value = self.transport.post(
            &ResourcePath::new("auth").join("signin"),
            &json!({ "login": login, "password": password }),
        )?;
        let auth = serde_json::from_value(value)?;
        info!(login, "signed in");
        Ok(auth)
    }

    /// Invalidate `refresh_token` on the server.
    pub fn logout(&self, login: &str, refresh_token: &str) -> Result<()> {
        self.transport.post(
            &ResourcePath::new("auth").join("signout"),
            &json!({ "login": login, "refreshToken": refresh_token }),
        )?;
        info!(login, "signed out");
        Ok(())
    }
}
