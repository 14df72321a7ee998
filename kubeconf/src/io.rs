use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{direct, Error, KubeConfig, Result};

/// Loads the kubeconfig at `path`.
///
/// A missing file, or one holding only whitespace, yields an empty config.
/// Anything else that fails to parse is an [`Error::Parse`].
pub fn read_config_or_new(path: impl AsRef<Path>) -> Result<KubeConfig> {
    let path = path.as_ref();

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No kube config found, starting empty");
            return Ok(KubeConfig::new());
        }
        Err(source) => {
            return Err(Error::Read {
                path: path.to_owned(),
                source,
            })
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        debug!(path = %path.display(), "Kube config is empty, starting empty");
        return Ok(KubeConfig::new());
    }

    let raw: direct::KubeConfig =
        serde_yaml::from_slice(&bytes).map_err(|source| Error::Parse {
            path: path.to_owned(),
            source,
        })?;

    debug!(
        path = %path.display(),
        clusters = raw.clusters.len(),
        users = raw.users.len(),
        contexts = raw.contexts.len(),
        "Loaded kube config"
    );

    Ok(raw.into())
}

/// Replaces the file at `path` with `kc`.
///
/// The new content goes to a temporary file beside the target which is then
/// renamed over it, so the old file stays whole if anything fails. The file
/// is readable and writable by its owner only. When `path` is a symlink the
/// file it points at is replaced and the link is left in place.
pub fn write_config(kc: &KubeConfig, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if path.file_name().is_none() {
        return Err(Error::Config(format!(
            "{} does not name a file",
            path.display()
        )));
    }

    let raw = direct::KubeConfig::from(kc.clone());
    let contents = serde_yaml::to_vec(&raw).map_err(Error::Serialize)?;

    let target = resolve_target(path).map_err(Error::write(path))?;
    let path = target.as_path();

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(Error::write(dir))?;

    let mut file = NamedTempFile::new_in(dir).map_err(Error::write(path))?;
    file.write_all(&contents).map_err(Error::write(path))?;
    file.as_file().sync_all().map_err(Error::write(path))?;
    restrict_permissions(file.as_file()).map_err(Error::write(path))?;
    file.persist(path)
        .map_err(|err| err.error)
        .map_err(Error::write(path))?;

    debug!(path = %path.display(), bytes = contents.len(), "Wrote kube config");

    Ok(())
}

/// Follows a symlinked `path` to the file it names. A dangling link resolves
/// to where it points, one hop relative to the link's directory.
fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(target) => Ok(target),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let link = fs::read_link(path)?;
                Ok(match path.parent() {
                    Some(dir) => dir.join(link),
                    None => link,
                })
            }
            Err(err) => Err(err),
        },
        _ => Ok(path.to_owned()),
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}
