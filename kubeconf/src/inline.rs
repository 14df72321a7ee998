use std::fs;
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{ClusterSpec, Error, KubeConfig, Result, UserSpec};

/// Moves the file at `path` into `data` as base64, unless `data` is already set.
fn inline_data(path: &mut Option<PathBuf>, data: &mut Option<String>) -> Result<()> {
    if data.is_some() {
        return Ok(());
    }

    let Some(file) = path.as_ref() else {
        return Ok(());
    };

    let bytes = fs::read(file).map_err(|source| Error::Inline {
        path: file.clone(),
        source,
    })?;
    *data = Some(STANDARD.encode(bytes));
    *path = None;

    Ok(())
}

impl ClusterSpec {
    pub fn inline(&mut self) -> Result<()> {
        inline_data(
            &mut self.certificate_authority,
            &mut self.certificate_authority_data,
        )
    }
}

impl UserSpec {
    pub fn inline(&mut self) -> Result<()> {
        inline_data(&mut self.client_certificate, &mut self.client_certificate_data)?;
        inline_data(&mut self.client_key, &mut self.client_key_data)?;

        Ok(())
    }
}

impl KubeConfig {
    /// Embeds every referenced certificate and key file.
    pub fn inline(&mut self) -> Result<()> {
        for cluster in self.clusters.values_mut() {
            cluster.inline()?;
        }

        for user in self.users.values_mut() {
            user.inline()?;
        }

        Ok(())
    }
}
