//! File-backed store for uploaded company assets.
//!
//! Logos land under `<data_dir>/company-logos/` with generated names
//! and are served back as static files, so the stored reference is a
//! plain public URL.

use anyhow::{anyhow, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

const LOGO_DIR: &str = "company-logos";

/// Extensions accepted for logo uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// Blob storage for company assets, rooted at the configured data
/// directory and exposed under `<public_base_url>/assets/`.
#[derive(Clone)]
pub struct AssetStore {
    base_dir: PathBuf,
    public_base_url: String,
}

impl AssetStore {
    pub fn new(base_dir: PathBuf, public_base_url: String) -> Self {
        Self { base_dir, public_base_url }
    }

    /// Directory served as `/assets` by the HTTP layer.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Whether a file extension is acceptable for a logo upload.
    pub fn is_allowed_extension(extension: &str) -> bool {
        ALLOWED_EXTENSIONS.contains(&extension.trim_start_matches('.').to_ascii_lowercase().as_str())
    }

    /// Store logo bytes and return the publicly resolvable URL.
    pub fn store_logo(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        if !Self::is_allowed_extension(&extension) {
            return Err(anyhow!("Unsupported logo file extension: {}", extension));
        }
        if bytes.is_empty() {
            return Err(anyhow!("Logo upload is empty"));
        }

        let logo_dir = self.base_dir.join(LOGO_DIR);
        if !logo_dir.exists() {
            fs::create_dir_all(&logo_dir)?;
            info!("Created logo directory: {:?}", logo_dir);
        }

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let file_path = logo_dir.join(&file_name);

        // Atomic write using temp file
        let temp_path = file_path.with_extension("tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &file_path)?;

        info!("Stored logo {} ({} bytes)", file_name, bytes.len());

        Ok(format!("{}/assets/{}/{}", self.public_base_url, LOGO_DIR, file_name))
    }
}
