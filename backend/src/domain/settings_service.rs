use chrono::Utc;
use log::info;
use shared::SaveSettingsRequest;

use crate::db::DbConnection;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::{CompanySettings, SETTINGS_ID};
use crate::storage::assets::AssetStore;
use crate::storage::sql::SqlSettingsRepository;
use crate::storage::traits::SettingsStore;

/// Service for the company settings singleton and logo uploads.
#[derive(Clone)]
pub struct SettingsService {
    settings: SqlSettingsRepository,
    assets: AssetStore,
}

impl SettingsService {
    pub fn new(db: DbConnection, assets: AssetStore) -> Self {
        Self {
            settings: SqlSettingsRepository::new(db),
            assets,
        }
    }

    /// Get the company settings, or None if they were never saved
    pub async fn get_settings(&self) -> DomainResult<Option<CompanySettings>> {
        Ok(self.settings.get_settings().await?)
    }

    /// Save the company settings, creating the singleton row on first use
    pub async fn save_settings(&self, request: SaveSettingsRequest) -> DomainResult<CompanySettings> {
        info!("Saving company settings");

        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Company name cannot be empty"));
        }
        if request.email.trim().is_empty() {
            return Err(DomainError::validation("Company email cannot be empty"));
        }

        let now = Utc::now();
        let created_at = self
            .settings
            .get_settings()
            .await?
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let settings = CompanySettings {
            id: SETTINGS_ID.to_string(),
            name: request.name.trim().to_string(),
            address: request.address.trim().to_string(),
            phone: request.phone.trim().to_string(),
            email: request.email.trim().to_string(),
            logo_url: request.logo_url,
            created_at,
            updated_at: now,
        };

        self.settings.upsert_settings(&settings).await?;

        info!("Saved company settings for '{}'", settings.name);

        Ok(settings)
    }

    /// Store uploaded logo bytes and return the public URL.
    ///
    /// The URL is only returned, not written onto the settings row; the
    /// caller saves it with the rest of the settings form.
    pub async fn upload_logo(&self, bytes: &[u8], file_name: &str) -> DomainResult<String> {
        info!("Uploading company logo: {} ({} bytes)", file_name, bytes.len());

        let extension = file_name
            .rsplit('.')
            .next()
            .filter(|ext| !ext.is_empty() && *ext != file_name)
            .ok_or_else(|| {
                DomainError::validation(format!("Logo file name has no extension: {}", file_name))
            })?;
        if !AssetStore::is_allowed_extension(extension) {
            return Err(DomainError::validation(format!(
                "Unsupported logo file type: {}",
                extension
            )));
        }
        if bytes.is_empty() {
            return Err(DomainError::validation("Logo upload is empty"));
        }

        let url = self.assets.store_logo(bytes, extension)?;

        info!("Logo stored at {}", url);

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_test() -> (SettingsService, TempDir) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let temp_dir = TempDir::new().unwrap();
        let assets = AssetStore::new(
            temp_dir.path().to_path_buf(),
            "http://localhost:3000".to_string(),
        );
        (SettingsService::new(db, assets), temp_dir)
    }

    fn save_request(name: &str) -> SaveSettingsRequest {
        SaveSettingsRequest {
            name: name.to_string(),
            address: "12 Galle Road, Colombo".to_string(),
            phone: "0112345678".to_string(),
            email: "hello@studio.example".to_string(),
            logo_url: None,
        }
    }

    #[tokio::test]
    async fn settings_are_none_until_first_save() {
        let (service, _dir) = setup_test().await;
        assert!(service.get_settings().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_creates_the_singleton_lazily() {
        let (service, _dir) = setup_test().await;

        let saved = service.save_settings(save_request("Studio One")).await.unwrap();
        assert_eq!(saved.id, SETTINGS_ID);

        let loaded = service.get_settings().await.unwrap().unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn repeated_saves_update_in_place_and_keep_created_at() {
        let (service, _dir) = setup_test().await;

        let first = service.save_settings(save_request("First")).await.unwrap();
        let second = service.save_settings(save_request("Second")).await.unwrap();

        assert_eq!(second.id, SETTINGS_ID);
        assert_eq!(second.name, "Second");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn save_validates_required_fields() {
        let (service, _dir) = setup_test().await;

        let mut request = save_request(" ");
        request.name = " ".to_string();
        assert!(matches!(
            service.save_settings(request).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn upload_logo_returns_public_url() {
        let (service, _dir) = setup_test().await;

        let url = service.upload_logo(b"png-bytes", "logo.png").await.unwrap();
        assert!(url.starts_with("http://localhost:3000/assets/company-logos/"));
        assert!(url.ends_with(".png"));
    }

    #[tokio::test]
    async fn upload_logo_rejects_bad_files() {
        let (service, _dir) = setup_test().await;

        assert!(matches!(
            service.upload_logo(b"bytes", "logo.exe").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.upload_logo(b"bytes", "no-extension").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.upload_logo(b"", "logo.png").await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn saved_logo_url_round_trips() {
        let (service, _dir) = setup_test().await;

        let url = service.upload_logo(b"png-bytes", "logo.png").await.unwrap();
        let mut request = save_request("Studio One");
        request.logo_url = Some(url.clone());

        let saved = service.save_settings(request).await.unwrap();
        assert_eq!(saved.logo_url, Some(url));
    }
}
