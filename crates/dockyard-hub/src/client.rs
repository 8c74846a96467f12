//! Docker Hub API client.

use dockyard_common::{DockyardError, DockyardResult};
use reqwest::{Client, StatusCode};

use crate::models::{DeleteRequest, ImagePage, ImageRecord, TokenResponse};

/// Images requested per listing page.
pub const PAGE_SIZE: u32 = 100;

/// Client for the Docker Hub namespace API.
pub struct HubClient {
    client: Client,
    base_url: String,
    namespace: String,
    token: Option<String>,
}

impl HubClient {
    /// Create a new client for `namespace` on the API at `base_url`.
    pub fn new(base_url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            namespace: namespace.into(),
            token: None,
        }
    }

    /// Use an existing bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn bearer(&self) -> DockyardResult<&str> {
        self.token.as_deref().ok_or_else(|| DockyardError::Auth {
            message: "not logged in".to_string(),
        })
    }

    /// Exchange credentials for a bearer token and keep it for later calls.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::Auth`] unless the login endpoint answers 200
    /// with a token.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> DockyardResult<String> {
        let url = format!("{}/v2/users/login", self.base_url);
        tracing::debug!(url = %url, username, "Requesting bearer token");

        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| DockyardError::Auth {
                message: format!("Failed to reach login endpoint: {}", e),
            })?;

        if response.status() != StatusCode::OK {
            return Err(DockyardError::Auth {
                message: format!("login returned {}", response.status().as_u16()),
            });
        }

        let token_resp: TokenResponse = response.json().await.map_err(|e| DockyardError::Auth {
            message: format!("Failed to parse token response: {}", e),
        })?;

        let token = token_resp
            .token
            .or(token_resp.access_token)
            .ok_or_else(|| DockyardError::Auth {
                message: "No token in response".to_string(),
            })?;

        self.token = Some(token.clone());
        Ok(token)
    }

    /// List images inactive since `active_from`, following every page.
    ///
    /// A failing page ends the listing; images from earlier pages are still
    /// returned.
    pub async fn list_inactive_images(&self, repository: &str, active_from: &str) -> Vec<ImageRecord> {
        let mut images = Vec::new();
        let mut page = 1;

        loop {
            match self.fetch_page(repository, active_from, page).await {
                Ok(data) => {
                    images.extend(data.results);
                    if data.next.is_none() {
                        break;
                    }
                    page += 1;
                }
                Err(e) => {
                    tracing::error!(
                        repository,
                        page,
                        error = %e,
                        "Failed to get image list for {}",
                        repository
                    );
                    break;
                }
            }
        }

        tracing::debug!(repository, count = images.len(), pages = page, "Listed inactive images");
        images
    }

    /// Fetch one page of the inactive image listing.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::Auth`] before login,
    /// [`DockyardError::Network`] on transport failure,
    /// [`DockyardError::Registry`] on a non-200 status, and
    /// [`DockyardError::Serialization`] on an unreadable body.
    pub async fn fetch_page(&self, repository: &str, active_from: &str, page: u32) -> DockyardResult<ImagePage> {
        let url = format!(
            "{}/v2/namespaces/{}/repositories/{}/images",
            self.base_url, self.namespace, repository
        );
        tracing::debug!(url = %url, page, "Getting image page");

        let page_param = page.to_string();
        let page_size = PAGE_SIZE.to_string();
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.bearer()?)
            .query(&[
                ("status", "inactive"),
                ("ordering", "last_activity"),
                ("active_from", active_from),
                ("page", page_param.as_str()),
                ("page_size", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DockyardError::Network {
                message: format!("Failed to request image list: {}", e),
            })?;

        if response.status() != StatusCode::OK {
            return Err(DockyardError::Registry {
                status: response.status().as_u16(),
                message: format!("Failed to get image list for {}", repository),
            });
        }

        response
            .json()
            .await
            .map_err(|e| DockyardError::Serialization(format!("Failed to parse image list: {}", e)))
    }

    /// Submit one delete-images call.
    ///
    /// # Errors
    ///
    /// Returns [`DockyardError::Auth`] before login,
    /// [`DockyardError::Network`] on transport failure and
    /// [`DockyardError::Registry`] on a non-200 status.
    pub async fn delete_batch(&self, request: &DeleteRequest) -> DockyardResult<()> {
        let url = format!("{}/v2/namespaces/{}/delete-images", self.base_url, self.namespace);
        tracing::debug!(
            url = %url,
            manifests = request.manifests.len(),
            warnings = request.ignore_warnings.len(),
            dry_run = request.dry_run,
            "Submitting delete request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer()?)
            .json(request)
            .send()
            .await
            .map_err(|e| DockyardError::Network {
                message: format!("Failed to request image deletion: {}", e),
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DockyardError::Registry {
                status,
                message: format!("Failed to delete images: {}", body.trim()),
            });
        }

        Ok(())
    }
}
