//! Absolute page addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::errors::InvalidAddressError;

/// An absolute `http`/`https` address of a page.
///
/// Addresses compare by their normalized URL text, so `HTTPS://Example.org/wiki/A`
/// and `https://example.org/wiki/A` are the same page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(Url);

impl Address {
    /// Parses an absolute address.
    pub fn parse(input: &str) -> Result<Self, InvalidAddressError> {
        let url = Url::parse(input.trim())
            .map_err(|e| InvalidAddressError::new(input, e.to_string()))?;
        Self::from_url(url).map_err(|reason| InvalidAddressError::new(input, reason))
    }

    fn from_url(url: Url) -> Result<Self, String> {
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(format!("unsupported scheme '{other}'")),
        }
        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(Self(url)),
            _ => Err("address has no host".to_string()),
        }
    }

    /// The base address: scheme and host (plus an explicit port) of this one.
    #[must_use]
    pub fn base(&self) -> Self {
        let mut base = self.0.clone();
        base.set_path("/");
        base.set_query(None);
        base.set_fragment(None);
        // Credentials never belong to the base a link is resolved against.
        let _ = base.set_username("");
        let _ = base.set_password(None);
        Self(base)
    }

    /// Resolves a (possibly relative) reference against this address.
    pub fn join(&self, reference: &str) -> Result<Self, InvalidAddressError> {
        let url = self
            .0
            .join(reference)
            .map_err(|e| InvalidAddressError::new(reference, e.to_string()))?;
        Self::from_url(url).map_err(|reason| InvalidAddressError::new(reference, reason))
    }

    /// Returns this address without its `#fragment`.
    #[must_use]
    pub fn without_fragment(mut self) -> Self {
        self.0.set_fragment(None);
        self
    }

    /// The path component, e.g. `/wiki/Rust`.
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// The host component.
    #[must_use]
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// The full address as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The underlying URL.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for Address {
    type Err = InvalidAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = InvalidAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0.into()
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
