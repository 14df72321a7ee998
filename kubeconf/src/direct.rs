//! The kubeconfig as it is laid out on disk.
//!
//! Entries are stored as lists of `{name, <kind>}` pairs. Fields this crate
//! does not model are captured in `other` maps so that a read followed by a
//! write leaves them intact.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value as YamlValue;

pub const DEFAULT_KIND: &str = "Config";
pub const DEFAULT_API_VERSION: &str = "v1";

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// region: Extension
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NamedExtension {
    pub name: String,
    #[serde(default, skip_serializing_if = "YamlValue::is_null")]
    pub extension: YamlValue,
}
// endregion

// region: Context
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ContextSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cluster: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub extensions: Vec<NamedExtension>,
    #[serde(flatten)]
    pub other: BTreeMap<String, YamlValue>,
}

impl ContextSpec {
    pub fn new(cluster: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            user: user.into(),
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Context {
    pub name: String,
    pub context: ContextSpec,
}
// endregion

// region: Cluster
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_skip_tls_verify: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub extensions: Vec<NamedExtension>,
    #[serde(flatten)]
    pub other: BTreeMap<String, YamlValue>,
}

impl ClusterSpec {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Cluster {
    pub name: String,
    pub cluster: ClusterSpec,
}
// endregion

// region: User
/// Client credentials, known to kubectl as an `AuthInfo`.
///
/// Certificate, token and basic-auth fields may all be present at once;
/// nothing here enforces that only one form is used.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct UserSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub extensions: Vec<NamedExtension>,
    #[serde(flatten)]
    pub other: BTreeMap<String, YamlValue>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct User {
    pub name: String,
    pub user: UserSpec,
}
// endregion

// region: Common
fn default_kind() -> String {
    DEFAULT_KIND.to_owned()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_owned()
}

pub(crate) fn default_preferences() -> YamlValue {
    YamlValue::Mapping(serde_yaml::Mapping::new())
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct KubeConfig {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clusters: Vec<Cluster>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contexts: Vec<Context>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_context: String,
    #[serde(default = "default_preferences")]
    pub preferences: YamlValue,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub extensions: Vec<NamedExtension>,
    #[serde(flatten)]
    pub other: BTreeMap<String, YamlValue>,
}
// endregion
