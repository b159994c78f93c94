//! HTTP client for the PetFriends API
//!
//! Every operation returns the status code and parsed body exactly as the
//! service sent them. There are no retries and no local validation.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Url};

use crate::common::config::Config;
use crate::common::{Error, Result};

use super::types::{ApiResponse, AuthKey, Credentials, PetFields, PetFilter};

/// Header carrying the auth key on authenticated requests
const AUTH_HEADER: &str = "auth_key";

/// Client for one PetFriends service instance
#[derive(Debug, Clone)]
pub struct PetFriends {
    http: reqwest::Client,
    base_url: Url,
}

impl PetFriends {
    /// Create a client for the given base URL
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client with an optional per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(&config.service.base_url, config.timeouts.request())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Request an auth key for the given account
    pub async fn get_api_key(&self, email: &str, password: &str) -> Result<ApiResponse> {
        let request = self
            .http
            .get(self.route("api/key")?)
            .header("email", email)
            .header("password", password);

        self.send("get_api_key", request).await
    }

    /// Obtain an auth key, failing unless the service answers 200 with a key
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthKey> {
        let response = self
            .get_api_key(credentials.email(), credentials.password())
            .await?;

        if response.status != 200 {
            return Err(Error::AuthenticationFailed {
                status: response.status,
            });
        }
        response.auth_key()
    }

    /// List all pets, or only the caller's own
    pub async fn get_list_of_pets(&self, key: &AuthKey, filter: PetFilter) -> Result<ApiResponse> {
        let request = self
            .http
            .get(self.route("api/pets")?)
            .header(AUTH_HEADER, key.as_str())
            .query(&[("filter", filter.as_query())]);

        self.send("get_list_of_pets", request).await
    }

    /// Create a pet with a photo
    pub async fn add_new_pet(
        &self,
        key: &AuthKey,
        fields: &PetFields,
        photo: &Path,
    ) -> Result<ApiResponse> {
        let form = Form::new()
            .text("name", fields.name.clone())
            .text("animal_type", fields.animal_type.clone())
            .text("age", fields.age.to_string())
            .part("pet_photo", photo_part(photo).await?);

        let request = self
            .http
            .post(self.route("api/pets")?)
            .header(AUTH_HEADER, key.as_str())
            .multipart(form);

        self.send("add_new_pet", request).await
    }

    /// Create a pet without a photo
    pub async fn add_new_pet_simple(&self, key: &AuthKey, fields: &PetFields) -> Result<ApiResponse> {
        let request = self
            .http
            .post(self.route("api/create_pet_simple")?)
            .header(AUTH_HEADER, key.as_str())
            .form(fields);

        self.send("add_new_pet_simple", request).await
    }

    /// Attach a photo to an existing pet
    pub async fn add_photo_of_pet(
        &self,
        key: &AuthKey,
        pet_id: &str,
        photo: &Path,
    ) -> Result<ApiResponse> {
        let form = Form::new().part("pet_photo", photo_part(photo).await?);

        let request = self
            .http
            .post(self.pet_route(&["set_photo", pet_id])?)
            .header(AUTH_HEADER, key.as_str())
            .multipart(form);

        self.send("add_photo_of_pet", request).await
    }

    /// Replace a pet's name, type and age
    pub async fn update_pet_info(
        &self,
        key: &AuthKey,
        pet_id: &str,
        fields: &PetFields,
    ) -> Result<ApiResponse> {
        let request = self
            .http
            .put(self.pet_route(&[pet_id])?)
            .header(AUTH_HEADER, key.as_str())
            .form(fields);

        self.send("update_pet_info", request).await
    }

    /// Delete a pet
    pub async fn delete_pet(&self, key: &AuthKey, pet_id: &str) -> Result<ApiResponse> {
        let request = self
            .http
            .delete(self.pet_route(&[pet_id])?)
            .header(AUTH_HEADER, key.as_str());

        self.send("delete_pet", request).await
    }

    fn route(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| Error::InvalidBaseUrl {
            url: self.base_url.to_string(),
            reason: e.to_string(),
        })
    }

    /// `api/pets/<segments...>` with each segment percent-encoded
    fn pet_route(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.route("api/pets")?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<ApiResponse> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let url = response.url().path().to_string();
        let text = response.text().await?;

        tracing::debug!("{} {} -> {}", operation, url, status);

        ApiResponse::decode(status, &text)
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    // Without a trailing slash, Url::join would replace the last segment
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };

    let url = Url::parse(&normalized).map_err(|e| Error::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    Ok(url)
}

async fn photo_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::file_read(path, &e))?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());

    Ok(Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime_for(path))?)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = PetFriends::new("http://localhost:8080/v1").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/v1/");
        assert_eq!(
            client.route("api/key").unwrap().as_str(),
            "http://localhost:8080/v1/api/key"
        );
    }

    #[test]
    fn test_invalid_base_urls() {
        assert!(matches!(
            PetFriends::new("not a url"),
            Err(Error::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            PetFriends::new("ftp://example.com/"),
            Err(Error::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_pet_route_encodes_segments() {
        let client = PetFriends::new("https://petfriends.skillfactory.ru/").unwrap();
        assert_eq!(
            client.pet_route(&["set_photo", "abc-123"]).unwrap().as_str(),
            "https://petfriends.skillfactory.ru/api/pets/set_photo/abc-123"
        );
        assert_eq!(
            client.pet_route(&["a/b"]).unwrap().as_str(),
            "https://petfriends.skillfactory.ru/api/pets/a%2Fb"
        );
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_for(Path::new("images/cat1.jpg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("images/CAT.JPEG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("p.png")), "image/png");
        assert_eq!(mime_for(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_photo_is_file_read_error() {
        let err = photo_part(Path::new("/definitely/not/here.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
