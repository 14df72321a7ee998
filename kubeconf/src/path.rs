//! Where the kubeconfig lives when nobody says otherwise.

use std::env;
use std::path::PathBuf;

pub const KUBECONFIG: &str = "KUBECONFIG";

pub fn kube_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kube"))
}

/// The first entry of `$KUBECONFIG`, or `~/.kube/config`.
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os(KUBECONFIG)
        .and_then(|list| env::split_paths(&list).find(|p| !p.as_os_str().is_empty()))
        .or_else(|| kube_dir().map(|dir| dir.join("config")))
}
