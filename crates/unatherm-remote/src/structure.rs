//! Structure retrieval: downloads PDB coordinate files for a matched
//! identifier so they can be rendered elsewhere.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::error::RemoteError;

pub const RCSB_DOWNLOAD_URL: &str = "https://files.rcsb.org/download";

/// PDB identifiers are four letters or digits.
pub fn is_valid_pdb_id(id: &str) -> bool {
    id.len() == 4 && id.chars().all(|c| c.is_ascii_alphanumeric())
}

pub struct StructureClient {
    client: Client,
    base_url: String,
}

impl StructureClient {
    pub fn new(timeout: Duration) -> Result<Self, RemoteError> {
        Self::with_base_url(RCSB_DOWNLOAD_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Session(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Download URL for an identifier, normalized to upper case.
    pub fn structure_url(&self, id: &str) -> Result<String, RemoteError> {
        let id = id.trim().to_uppercase();
        if !is_valid_pdb_id(&id) {
            return Err(RemoteError::InvalidIdentifier(format!(
                "'{}' is not a four-character PDB ID",
                id
            )));
        }
        Ok(format!("{}/{}.pdb", self.base_url, id))
    }

    /// Fetch the PDB file text.
    pub async fn fetch(&self, id: &str) -> Result<String, RemoteError> {
        let url = self.structure_url(id)?;
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Http(format!("{} from {}", status, url)));
        }
        Ok(response.text().await?)
    }

    /// Fetch and save as `<dir>/<ID>.pdb`.
    pub async fn download_to(&self, id: &str, dir: &Path) -> Result<PathBuf, RemoteError> {
        let body = self.fetch(id).await?;
        let path = dir.join(format!("{}.pdb", id.trim().to_uppercase()));
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| RemoteError::Session(format!("create {}: {}", dir.display(), e)))?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| RemoteError::Session(format!("write {}: {}", path.display(), e)))?;
        info!("Saved structure {} to {}", id, path.display());
        Ok(path)
    }
}
