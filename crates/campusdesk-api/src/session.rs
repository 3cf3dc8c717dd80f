// Bearer-token authentication.
//
// `POST auth/login` returns `{status: true, data: {token, user}}`. The token
// is kept in the client's swappable slot and attached to every request
// until `logout` clears it.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::envelope::Envelope;
use crate::error::Error;

/// Login endpoint relative to the API base URL.
pub const LOGIN_PATH: &str = "auth/login";

/// Role embedded in the login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    #[serde(deserialize_with = "crate::de::u64_lenient")]
    pub id: u64,
    pub name: String,
}

/// The authenticated staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(deserialize_with = "crate::de::u64_lenient")]
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<RoleSummary>,
}

/// An authenticated session: bearer token plus the user it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SecretString,
    pub user: AuthUser,
}

#[derive(Deserialize)]
struct LoginData {
    #[serde(default)]
    token: Option<String>,
    user: AuthUser,
}

impl ApiClient {
    /// Authenticate with email and password.
    ///
    /// On success the returned token is installed on this client so every
    /// following request carries it.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, Error> {
        let url = self.url(LOGIN_PATH)?;
        debug!("logging in at {url}");

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let resp = self.send(Method::POST, url, &[], Some(&body)).await?;

        let envelope: Envelope<LoginData> = Self::decode(resp).await?;
        let rejected = |message: Option<String>| Error::Rejected {
            message: message.unwrap_or_else(|| "Login failed".into()),
        };

        if !envelope.status {
            return Err(rejected(envelope.message));
        }
        let Some(LoginData {
            token: Some(token),
            user,
        }) = envelope.data
        else {
            return Err(rejected(envelope.message));
        };

        let token = SecretString::from(token);
        self.set_token(token.clone());
        info!(user = %user.email, "login successful");

        Ok(Session { token, user })
    }

    /// End the session locally. The backend keeps no server-side state to
    /// revoke, so this only forgets the token.
    pub fn logout(&self) {
        self.clear_token();
        info!("logged out");
    }
}
