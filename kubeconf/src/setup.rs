use std::path::{Path, PathBuf};

use tracing::info;

use crate::{read_config_or_new, write_config, ClusterSpec, ContextSpec, Error, Result, UserSpec};

/// Everything needed to point a kubeconfig at one cluster.
///
/// The cluster, user and context are all stored under `cluster_name`.
#[derive(Debug, Clone, Default)]
pub struct KubeConfigSetup {
    pub kube_config_file: PathBuf,
    pub cluster_name: String,
    pub cluster_server_address: String,
    pub client_certificate: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub certificate_authority: Option<PathBuf>,
    /// Leave an already chosen current context in place.
    pub keep_context: bool,
    /// Store certificate and key contents instead of their paths.
    pub embed_certs: bool,
}

impl KubeConfigSetup {
    fn validate(&self) -> Result<()> {
        if self.cluster_name.is_empty() {
            return Err(Error::Config("cluster name is empty".into()));
        }
        if self.cluster_server_address.is_empty() {
            return Err(Error::Config("cluster server address is empty".into()));
        }
        if self.kube_config_file.file_name().is_none() {
            return Err(Error::Config(format!(
                "{} does not name a file",
                self.kube_config_file.display()
            )));
        }
        Ok(())
    }

    fn cluster(&self) -> ClusterSpec {
        ClusterSpec {
            certificate_authority: non_empty(&self.certificate_authority),
            ..ClusterSpec::new(&self.cluster_server_address)
        }
    }

    fn user(&self) -> UserSpec {
        UserSpec {
            client_certificate: non_empty(&self.client_certificate),
            client_key: non_empty(&self.client_key),
            ..UserSpec::default()
        }
    }
}

fn non_empty(path: &Option<PathBuf>) -> Option<PathBuf> {
    path.clone().filter(|p| !p.as_os_str().is_empty())
}

/// Merges the cluster described by `setup` into its kubeconfig file.
///
/// Entries with the same name are replaced; everything else in the file is
/// kept. The file is only touched by the final write.
pub fn setup_kube_config(setup: &KubeConfigSetup) -> Result<()> {
    setup.validate()?;

    let mut kc = read_config_or_new(&setup.kube_config_file)?;
    let name = setup.cluster_name.as_str();

    let mut cluster = setup.cluster();
    let mut user = setup.user();
    if setup.embed_certs {
        cluster.inline()?;
        user.inline()?;
    }

    kc.set_cluster(name, cluster);
    kc.set_user(name, user);
    kc.set_context(name, ContextSpec::new(name, name));

    if kc.switch_context(name, setup.keep_context) {
        info!(context = name, "Switched current context");
    }

    write_config(&kc, &setup.kube_config_file)
}

/// Removes the cluster, user and context called `name`.
///
/// Returns `false` without writing when none of them existed.
pub fn delete_kube_config_context(path: impl AsRef<Path>, name: &str) -> Result<bool> {
    let path = path.as_ref();
    let mut kc = read_config_or_new(path)?;

    if !kc.remove_entry(name) {
        return Ok(false);
    }

    write_config(&kc, path)?;
    info!(context = name, path = %path.display(), "Deleted kube config entries");

    Ok(true)
}
