//! Host-facing resource parameter mapping and validated add requests.

use super::{ResourceMetadata, ResourceParamsError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameter key carrying the display name of a resource.
pub const NAME_PARAM: &str = "name";
/// Parameter key carrying the DNS name or IP address of a resource.
pub const ADDRESS_PARAM: &str = "address";
/// Parameter key carrying free-form operator notes.
pub const NOTES_PARAM: &str = "notes";
/// Parameter key reporting locally tracked connection health.
pub const HEALTH_PARAM: &str = "health";
/// Parameter key reporting the last successful health check (RFC 3339).
pub const LAST_GOOD_CHECK_PARAM: &str = "last_good_check";

/// String-keyed parameter mapping exchanged with the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceParams(BTreeMap<String, String>);

impl ResourceParams {
    /// Creates an empty parameter mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a parameter in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the notes parameter, or an empty string when absent.
    #[must_use]
    pub fn notes(&self) -> &str {
        self.get(NOTES_PARAM).unwrap_or_default()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Renders locally owned metadata into the parameter mapping returned
    /// alongside a broker resource.
    #[must_use]
    pub fn from_metadata(metadata: &ResourceMetadata) -> Self {
        let mut params = Self::new()
            .with(NOTES_PARAM, metadata.notes())
            .with(ADDRESS_PARAM, metadata.address())
            .with(HEALTH_PARAM, metadata.health().as_str());
        if let Some(checked_at) = metadata.last_good_check() {
            params.insert(LAST_GOOD_CHECK_PARAM, checked_at.to_rfc3339());
        }
        params
    }

    /// Derives fresh metadata from these parameters, as an update does.
    ///
    /// The keeper state starts over. The address is taken from the
    /// parameters when present and not blank, otherwise `current_address` is
    /// kept so the keeper can still reconnect.
    #[must_use]
    pub fn to_metadata(&self, current_address: &str) -> ResourceMetadata {
        let address = self
            .get(ADDRESS_PARAM)
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .unwrap_or(current_address);
        ResourceMetadata::new(self.notes(), address)
    }

    /// Returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for ResourceParams {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self(value)
    }
}

impl<K, V> FromIterator<(K, V)> for ResourceParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Validated payload for adding a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddResourceRequest {
    /// Name the broker registers the resource under.
    pub name: String,
    /// Address the broker connects to.
    pub address: String,
    /// Operator notes, empty when none were supplied.
    pub notes: String,
}

impl TryFrom<&ResourceParams> for AddResourceRequest {
    type Error = ResourceParamsError;

    /// Validates `address` before `name`, so a mapping missing both reports
    /// the address.
    fn try_from(params: &ResourceParams) -> Result<Self, Self::Error> {
        let address = required(params, ADDRESS_PARAM)?;
        let name = required(params, NAME_PARAM)?;
        Ok(Self {
            name,
            address,
            notes: params.notes().to_owned(),
        })
    }
}

fn required(params: &ResourceParams, field: &'static str) -> Result<String, ResourceParamsError> {
    let value = params
        .get(field)
        .ok_or(ResourceParamsError::MissingParameter(field))?
        .trim();
    if value.is_empty() {
        return Err(ResourceParamsError::BlankParameter(field));
    }
    Ok(value.to_owned())
}
