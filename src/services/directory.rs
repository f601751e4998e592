//! Clients for the user and hospital directories

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    config::DirectoryConfig,
    error::{AppError, AppResult},
    models::UserDto,
};

/// User directory lookups. No match yields an empty list or `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn service_supervisors(&self, token: &str, service_id: &str) -> AppResult<Vec<UserDto>>;
    async fn hospital_admin(&self, token: &str, hospital_id: &str) -> AppResult<Option<UserDto>>;
    /// Users of a hospital holding any of `roles`
    async fn hospital_users_with_roles(
        &self,
        token: &str,
        hospital_id: &str,
        roles: &[String],
    ) -> AppResult<Vec<UserDto>>;
}

/// Display names of hospitals and their services
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HospitalDirectory: Send + Sync {
    async fn service_name(&self, token: &str, service_id: &str) -> AppResult<Option<String>>;
    async fn hospital_name(&self, token: &str, hospital_id: &str) -> AppResult<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct NamedEntity {
    name: Option<String>,
}

/// Bearer-authenticated JSON GETs against one base URL
#[derive(Clone)]
struct JsonClient {
    http: Client,
    base_url: String,
}

impl JsonClient {
    fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `Ok(None)` on 404 or an empty body
    async fn get<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Directory(format!("GET {} returned {}", url, status)));
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| AppError::Directory(format!("Invalid response from {}: {}", url, e)))
    }
}

/// HTTP client for the user directory
#[derive(Clone)]
pub struct HttpUserDirectory {
    client: JsonClient,
}

impl HttpUserDirectory {
    pub fn new(config: &DirectoryConfig) -> AppResult<Self> {
        Ok(Self {
            client: JsonClient::new(&config.user_service_url, Duration::from_secs(config.timeout_seconds))?,
        })
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn service_supervisors(&self, token: &str, service_id: &str) -> AppResult<Vec<UserDto>> {
        let path = format!("/users/services/{}/supervisors", service_id);
        Ok(self.client.get(token, &path, &[]).await?.unwrap_or_default())
    }

    async fn hospital_admin(&self, token: &str, hospital_id: &str) -> AppResult<Option<UserDto>> {
        let path = format!("/users/hospitals/{}/admin", hospital_id);
        self.client.get(token, &path, &[]).await
    }

    async fn hospital_users_with_roles(
        &self,
        token: &str,
        hospital_id: &str,
        roles: &[String],
    ) -> AppResult<Vec<UserDto>> {
        let path = format!("/users/hospitals/{}", hospital_id);
        let query: Vec<(&str, &str)> = roles.iter().map(|role| ("roles", role.as_str())).collect();
        Ok(self.client.get(token, &path, &query).await?.unwrap_or_default())
    }
}

/// HTTP client for the hospital directory
#[derive(Clone)]
pub struct HttpHospitalDirectory {
    client: JsonClient,
}

impl HttpHospitalDirectory {
    pub fn new(config: &DirectoryConfig) -> AppResult<Self> {
        Ok(Self {
            client: JsonClient::new(
                &config.hospital_service_url,
                Duration::from_secs(config.timeout_seconds),
            )?,
        })
    }
}

#[async_trait]
impl HospitalDirectory for HttpHospitalDirectory {
    async fn service_name(&self, token: &str, service_id: &str) -> AppResult<Option<String>> {
        let path = format!("/services/{}", service_id);
        let entity: Option<NamedEntity> = self.client.get(token, &path, &[]).await?;
        Ok(entity.and_then(|e| e.name))
    }

    async fn hospital_name(&self, token: &str, hospital_id: &str) -> AppResult<Option<String>> {
        let path = format!("/hospitals/{}", hospital_id);
        let entity: Option<NamedEntity> = self.client.get(token, &path, &[]).await?;
        Ok(entity.and_then(|e| e.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = JsonClient::new("http://localhost:8081/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:8081/api");
    }

    #[tokio::test]
    async fn test_unreachable_directory_is_a_directory_error() {
        let config = DirectoryConfig {
            user_service_url: "http://127.0.0.1:9".into(),
            hospital_service_url: "http://127.0.0.1:9".into(),
            timeout_seconds: 1,
        };
        let users = HttpUserDirectory::new(&config).unwrap();
        let result = users.service_supervisors("token", "svc-1").await;
        assert!(matches!(result, Err(AppError::Directory(_))));
    }
}
