use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use tokio::sync::RwLock;
use zeroize::Zeroizing;

/// A Basic-auth username/password pair.
///
/// The password is wrapped in [`Zeroizing`] so it is scrubbed from memory
/// the moment it is dropped — including when [`SecretStore::reload`]
/// replaces an old value.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl Credentials {
    /// Builds a new credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    fn basic_auth_value(&self) -> String {
        // ISO-8859-1 and UTF-8 agree on the ASCII subset; `username:password`
        // pairs are expected to be ASCII.
        let raw = format!("{}:{}", self.username, self.password.as_str());
        format!("Basic {}", B64.encode(raw.as_bytes()))
    }
}

/// Thread-safe holder of an optional [`Credentials`] pair.
///
/// Readers always observe either the value in place before a `reload` or
/// the value installed by it, never a tear — the whole `Option<Credentials>`
/// is swapped under one write-lock acquisition.
pub struct SecretStore {
    inner: RwLock<Option<Credentials>>,
}

impl SecretStore {
    /// Starts with no credentials configured.
    pub fn empty() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Starts pre-populated with a credential pair.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(Some(credentials)),
        }
    }

    /// Replaces the held credentials. The previous value (including its
    /// password) is dropped — and zeroized — once the write guard is
    /// released.
    pub async fn reload(&self, credentials: Option<Credentials>) {
        let mut guard = self.inner.write().await;
        *guard = credentials;
    }

    /// Produces the `Authorization: Basic ...` header value for the
    /// currently-held credentials, or `None` if no credentials are
    /// configured.
    pub async fn authorization_header(&self) -> Option<String> {
        let guard = self.inner.read().await;
        guard.as_ref().map(Credentials::basic_auth_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_credentials_yields_no_header() {
        let store = SecretStore::empty();
        assert_eq!(store.authorization_header().await, None);
    }

    #[tokio::test]
    async fn demo_credentials_match_known_vector() {
        let store = SecretStore::with_credentials(Credentials::new("demo", "demo"));
        assert_eq!(
            store.authorization_header().await,
            Some("Basic ZGVtbzpkZW1v".to_string())
        );
    }

    #[tokio::test]
    async fn reload_replaces_atomically() {
        let store = SecretStore::with_credentials(Credentials::new("a", "b"));
        store
            .reload(Some(Credentials::new("demo", "demo")))
            .await;
        assert_eq!(
            store.authorization_header().await,
            Some("Basic ZGVtbzpkZW1v".to_string())
        );

        store.reload(None).await;
        assert_eq!(store.authorization_header().await, None);
    }
}
