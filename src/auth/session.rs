//! Signed-cookie session state.
//!
//! The whole session lives client-side: a typed [`Session`] record is
//! serialized to JSON, base64url-encoded and stored in a cookie signed with
//! an HMAC key. Nothing is kept on the server.

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::config::SessionConfig;
use crate::{Result, VaultError};

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "filevault_session";

/// Session payload carried inside the signed cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Whether the holder has logged in.
    pub authenticated: bool,
    /// Username of the logged-in user (empty when unauthenticated).
    pub username: String,
}

impl Session {
    /// Session for a user who just logged in.
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            username: username.into(),
        }
    }

    /// Cleared session written on logout.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Check if this session grants access to protected routes.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Parse a SameSite policy name.
pub fn parse_same_site(value: &str) -> Result<SameSite> {
    match value.to_lowercase().as_str() {
        "strict" => Ok(SameSite::Strict),
        "lax" => Ok(SameSite::Lax),
        "none" => Ok(SameSite::None),
        other => Err(VaultError::Config(format!(
            "unknown same_site policy: {other}"
        ))),
    }
}

/// Encodes and decodes [`Session`] records in a signed cookie.
///
/// Constructed once at startup and shared through application state.
#[derive(Clone)]
pub struct SessionCodec {
    key: Key,
    cookie_name: String,
    secure: bool,
    same_site: SameSite,
}

impl SessionCodec {
    /// Create a codec whose signing key is derived from `secret`.
    ///
    /// The secret is stretched with SHA-512 so that any length yields the
    /// 64 bytes of key material the cookie jar requires.
    pub fn new(secret: &str) -> Self {
        let digest = Sha512::digest(secret.as_bytes());
        Self {
            key: Key::from(digest.as_slice()),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Create a codec from configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        if config.secret.is_empty() {
            return Err(VaultError::Config("session secret is empty".to_string()));
        }
        Ok(Self::new(&config.secret)
            .with_cookie_name(&config.cookie_name)
            .with_secure(config.secure)
            .with_same_site(parse_same_site(&config.same_site)?))
    }

    /// Set the cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the `Secure` attribute.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the `SameSite` attribute.
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Signing key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Cookie name.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Decode the session from a jar.
    ///
    /// A missing cookie, a bad signature or an undecodable payload all yield
    /// an unauthenticated session.
    pub fn load(&self, jar: &SignedCookieJar) -> Session {
        jar.get(&self.cookie_name)
            .and_then(|cookie| decode_payload(cookie.value()))
            .unwrap_or_default()
    }

    /// Sign `session` into the jar, replacing any previous session cookie.
    pub fn store(&self, jar: SignedCookieJar, session: &Session) -> Result<SignedCookieJar> {
        let value = encode_payload(session)?;
        let cookie = Cookie::build((self.cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site);
        Ok(jar.add(cookie))
    }
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("cookie_name", &self.cookie_name)
            .field("secure", &self.secure)
            .field("same_site", &self.same_site)
            .finish_non_exhaustive()
    }
}

fn encode_payload(session: &Session) -> Result<String> {
    let json = serde_json::to_vec(session)
        .map_err(|e| VaultError::Internal(format!("session encode failed: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_payload(value: &str) -> Option<Session> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}
