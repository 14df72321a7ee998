use std::collections::BTreeMap;

use serde_yaml::Value as YamlValue;

use crate::direct;
pub use crate::direct::{
    Cluster, ClusterSpec, Context, ContextSpec, NamedExtension, User, UserSpec,
};

/// A kubeconfig with its entries keyed by name.
///
/// Inserting under a name that already exists replaces the whole entry.
#[derive(Debug, Clone, PartialEq)]
pub struct KubeConfig {
    pub kind: String,
    pub api_version: String,
    pub clusters: BTreeMap<String, ClusterSpec>,
    pub users: BTreeMap<String, UserSpec>,
    pub contexts: BTreeMap<String, ContextSpec>,
    /// Empty when unset. May name a context that does not exist.
    pub current_context: String,
    pub preferences: YamlValue,
    pub extensions: Vec<NamedExtension>,
    pub other: BTreeMap<String, YamlValue>,
}

impl Default for KubeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl KubeConfig {
    pub fn new() -> Self {
        Self {
            kind: direct::DEFAULT_KIND.to_owned(),
            api_version: direct::DEFAULT_API_VERSION.to_owned(),
            clusters: BTreeMap::new(),
            users: BTreeMap::new(),
            contexts: BTreeMap::new(),
            current_context: String::new(),
            preferences: direct::default_preferences(),
            extensions: Vec::new(),
            other: BTreeMap::new(),
        }
    }

    pub fn set_cluster(&mut self, name: impl Into<String>, cluster: ClusterSpec) {
        self.clusters.insert(name.into(), cluster);
    }

    pub fn set_user(&mut self, name: impl Into<String>, user: UserSpec) {
        self.users.insert(name.into(), user);
    }

    /// The context is stored as given; its cluster and user need not exist.
    pub fn set_context(&mut self, name: impl Into<String>, context: ContextSpec) {
        self.contexts.insert(name.into(), context);
    }

    /// Points the current context at `name` unless `keep_context` is set and
    /// a current context is already chosen. Returns whether it moved.
    pub fn switch_context(&mut self, name: &str, keep_context: bool) -> bool {
        if keep_context && !self.current_context.is_empty() {
            return false;
        }
        if self.current_context == name {
            return false;
        }
        self.current_context = name.to_owned();
        true
    }

    pub fn current_context_spec(&self) -> Option<&ContextSpec> {
        self.contexts.get(&self.current_context)
    }

    /// Drops the cluster, user and context stored under `name`, and unsets
    /// the current context if it was `name`. Returns whether anything was
    /// removed.
    pub fn remove_entry(&mut self, name: &str) -> bool {
        let cluster = self.clusters.remove(name).is_some();
        let user = self.users.remove(name).is_some();
        let context = self.contexts.remove(name).is_some();

        if self.current_context == name {
            self.current_context.clear();
        }

        cluster || user || context
    }
}

impl From<direct::KubeConfig> for KubeConfig {
    fn from(kc: direct::KubeConfig) -> Self {
        Self {
            kind: kc.kind,
            api_version: kc.api_version,
            current_context: kc.current_context,
            preferences: kc.preferences,
            extensions: kc.extensions,
            other: kc.other,
            contexts: kc
                .contexts
                .into_iter()
                .map(|ctx| (ctx.name, ctx.context))
                .collect(),
            clusters: kc
                .clusters
                .into_iter()
                .map(|cls| (cls.name, cls.cluster))
                .collect(),
            users: kc
                .users
                .into_iter()
                .map(|usr| (usr.name, usr.user))
                .collect(),
        }
    }
}

impl From<KubeConfig> for direct::KubeConfig {
    fn from(kc: KubeConfig) -> Self {
        Self {
            kind: kc.kind,
            api_version: kc.api_version,
            preferences: kc.preferences,
            current_context: kc.current_context,
            extensions: kc.extensions,
            other: kc.other,

            clusters: kc
                .clusters
                .into_iter()
                .map(|(name, cluster)| Cluster { name, cluster })
                .collect(),
            contexts: kc
                .contexts
                .into_iter()
                .map(|(name, context)| Context { name, context })
                .collect(),
            users: kc
                .users
                .into_iter()
                .map(|(name, user)| User { name, user })
                .collect(),
        }
    }
}
