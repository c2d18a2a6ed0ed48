//! Transport-security settings handed to the broker when connecting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Certificate and key material used when connecting to a resource.
///
/// The resource manager does not interpret these settings; it passes the
/// shared instance to the broker on every connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSecurityConfig {
    /// CA bundle used to verify resource certificates.
    pub ca_certificate: Option<PathBuf>,
    /// Client certificate presented to resources.
    pub certificate: Option<PathBuf>,
    /// Private key for [`Self::certificate`].
    pub private_key: Option<PathBuf>,
    /// Server name to verify instead of the connect address.
    pub server_name: Option<String>,
}

impl TransportSecurityConfig {
    /// Returns whether a client certificate and key are both configured.
    #[must_use]
    pub const fn has_client_identity(&self) -> bool {
        self.certificate.is_some() && self.private_key.is_some()
    }
}
