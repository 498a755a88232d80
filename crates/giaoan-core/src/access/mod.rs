//! Convenience access gate backed by a remote CSV of credentials.
//!
//! This is not a security boundary: credentials are compared as plain text
//! and the resulting flag is a local store value anyone can set.

use giaoan_store::KeyValueStore;
use giaoan_store::StoreError;
use giaoan_store::queries::access;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Không tải được danh sách tài khoản!")]
    Fetch(#[source] reqwest::Error),

    #[error("Sai tài khoản hoặc mật khẩu!")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Credential list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Parsed `username,password` rows. Extra columns are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialList {
    entries: Vec<Credential>,
}

impl CredentialList {
    /// Parse CSV text. The first line is a header and is discarded.
    pub fn parse(csv: &str) -> Self {
        let entries = csv
            .split('\n')
            .skip(1)
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .map(|row| {
                // Columns past the second are ignored.
                let mut fields = row.split(',').map(str::trim);
                Credential {
                    username: fields.next().unwrap_or_default().to_string(),
                    password: fields.next().unwrap_or_default().to_string(),
                }
            })
            .collect();
        Self { entries }
    }

    /// Exact match on both fields.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.entries
            .iter()
            .any(|c| c.username == username && c.password == password)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Download and parse the credential CSV.
pub async fn fetch_credentials(
    client: &reqwest::Client,
    url: &str,
) -> Result<CredentialList, AccessError> {
    let body = async {
        client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "failed to fetch credential list");
        AccessError::Fetch(e)
    })?;

    let list = CredentialList::parse(&body);
    tracing::debug!(accounts = list.len(), "credential list loaded");
    Ok(list)
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Records login state in the store under `loggedIn`.
#[derive(Debug, Clone)]
pub struct AccessGate<S> {
    store: S,
}

impl<S: KeyValueStore> AccessGate<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Check credentials and record the login on success.
    pub fn login(
        &self,
        credentials: &CredentialList,
        username: &str,
        password: &str,
    ) -> Result<(), AccessError> {
        tracing::warn!("access gate uses plain-text credentials and is not a security boundary");
        if !credentials.verify(username, password) {
            tracing::info!(username, "login rejected");
            return Err(AccessError::InvalidCredentials);
        }
        access::set_logged_in(&self.store)?;
        tracing::info!(username, "login accepted");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), AccessError> {
        access::clear_logged_in(&self.store)?;
        Ok(())
    }

    pub fn is_logged_in(&self) -> Result<bool, AccessError> {
        Ok(access::is_logged_in(&self.store)?)
    }
}
