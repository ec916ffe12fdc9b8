//! HTTP client for the collaborator work order API.
//!
//! Every authenticated call attaches the stored bearer token. A 401 from any
//! call clears the stored session and surfaces [`Error::Unauthorized`]; the
//! request is never retried.

mod error_body;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

pub use error_body::parse_api_error;

use crate::config::ClientConfig;
use crate::error::{Error, Result, DEFAULT_FORBIDDEN_MESSAGE};
use crate::files::{file_url, UploadFile};
use crate::forms::FormSubmission;
use crate::models::{sort_notes_newest_first, CurrentUser, Note, Session, WorkOrder, WorkOrderId, WorkOrderStatus};
use crate::session::SessionPersistence;

/// Typed client over the collaborator REST endpoints.
#[derive(Clone)]
pub struct WorkOrderApi<S: SessionPersistence> {
    config: ClientConfig,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> WorkOrderApi<S> {
    pub fn new(config: ClientConfig, store: S) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            config,
            client,
            store,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The stored session, if any.
    pub fn current_session(&self) -> Result<Option<Session>> {
        self.store.load_session()
    }

    /// Fetchable URL for a storage key on this collaborator.
    #[must_use]
    pub fn file_url(&self, key: &str) -> Option<String> {
        file_url(self.base_url(), key)
    }

    /// Exchanges credentials for a bearer token and persists the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Username and password are required.".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::InvalidCredentials);
        }
        let response = self.check(response).await?;
        let payload = response.json::<LoginResponse>().await?;
        let token = payload
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::Api {
                status: 200,
                message: "Login response did not include a token".to_string(),
            })?;

        let session = Session::from_token(token);
        self.store.save_session(&session)?;
        tracing::info!("Signed in as {}", session.display_name());
        Ok(session)
    }

    /// Drops the local session. The collaborator has no logout endpoint.
    pub fn logout(&self) -> Result<()> {
        self.store.clear_session()
    }

    pub async fn me(&self) -> Result<CurrentUser> {
        let response = self.send(self.client.get(self.url("/auth/me"))).await?;
        Ok(response.json().await?)
    }

    /// All work orders visible to the session. A non-array body yields an empty list.
    pub async fn list_work_orders(&self) -> Result<Vec<WorkOrder>> {
        let response = self.send(self.client.get(self.url("/work-orders"))).await?;
        let payload = response.json::<serde_json::Value>().await?;
        if !payload.is_array() {
            tracing::warn!("Work order list response was not an array; showing no orders");
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn get_work_order(&self, id: WorkOrderId) -> Result<WorkOrder> {
        let response = self
            .send(self.client.get(self.url(&format!("/work-orders/{id}"))))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn update_status(&self, id: WorkOrderId, status: &WorkOrderStatus) -> Result<()> {
        self.send(
            self.client
                .put(self.url(&format!("/work-orders/{id}")))
                .json(&serde_json::json!({ "status": status.label() })),
        )
        .await?;
        tracing::info!("Updated work order {} status to {}", id, status);
        Ok(())
    }

    /// Re-submits every form field plus any attached files.
    pub async fn edit_work_order(&self, id: WorkOrderId, submission: &FormSubmission) -> Result<()> {
        submission.form.validate()?;
        let form = multipart_form(&submission.form.text_fields(), &submission.files)?;
        self.send(
            self.client
                .put(self.url(&format!("/work-orders/{id}/edit")))
                .multipart(form),
        )
        .await?;
        tracing::info!("Saved work order {}", id);
        Ok(())
    }

    pub async fn create_work_order(&self, submission: &FormSubmission) -> Result<()> {
        submission.form.validate()?;
        let form = multipart_form(&submission.form.text_fields(), &submission.files)?;
        self.send(self.client.post(self.url("/work-orders")).multipart(form))
            .await?;
        tracing::info!("Created work order for {}", submission.form.customer.trim());
        Ok(())
    }

    /// Attaches files to an existing order without touching its text fields.
    pub async fn upload_files(&self, id: WorkOrderId, files: &[UploadFile]) -> Result<()> {
        if files.is_empty() {
            return Err(Error::InvalidInput("No files selected".to_string()));
        }
        let form = multipart_form(&[], files)?;
        self.send(
            self.client
                .put(self.url(&format!("/work-orders/{id}/edit")))
                .multipart(form),
        )
        .await?;
        tracing::info!("Uploaded {} file(s) to work order {}", files.len(), id);
        Ok(())
    }

    pub async fn upload_photos(&self, id: WorkOrderId, photos: &[UploadFile]) -> Result<()> {
        self.upload_files(id, photos).await
    }

    /// Replaces the order's PDF with `pdf`.
    pub async fn replace_pdf(&self, id: WorkOrderId, pdf: &UploadFile) -> Result<()> {
        self.upload_files(id, std::slice::from_ref(pdf)).await
    }

    /// Appends a note and returns the full note list, newest first.
    pub async fn add_note(&self, id: WorkOrderId, text: &str) -> Result<Vec<Note>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("Note text cannot be empty".to_string()));
        }

        let response = self
            .send(
                self.client
                    .post(self.url(&format!("/work-orders/{id}/notes")))
                    .json(&serde_json::json!({ "text": text })),
            )
            .await?;
        let payload = response.json::<NotesResponse>().await?;
        let mut notes = payload.notes;
        sort_notes_newest_first(&mut notes);
        Ok(notes)
    }

    /// Removes one photo by storage key.
    pub async fn delete_attachment(&self, id: WorkOrderId, photo_path: &str) -> Result<()> {
        let photo_path = photo_path.trim();
        if photo_path.is_empty() {
            return Err(Error::InvalidInput("Photo key cannot be empty".to_string()));
        }
        self.send(
            self.client
                .delete(self.url(&format!("/work-orders/{id}/attachment")))
                .json(&serde_json::json!({ "photoPath": photo_path })),
        )
        .await?;
        tracing::info!("Deleted attachment from work order {}", id);
        Ok(())
    }

    /// Downloads a stored file, following the resolver's redirect.
    pub async fn download_file(&self, key: &str) -> Result<Vec<u8>> {
        let url = self
            .file_url(key)
            .ok_or_else(|| Error::InvalidInput("File key cannot be empty".to_string()))?;
        let request = self.client.get(&url);
        let response = if url.starts_with(self.base_url()) {
            self.send(request).await?
        } else {
            self.check(request.send().await?).await?
        };
        let bytes = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes for {}", bytes.len(), key);
        Ok(bytes.to_vec())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match self.store.load_session()? {
            Some(session) => request.bearer_auth(&session.token),
            None => request,
        };
        let response = request.send().await?;
        self.check(response).await
    }

    async fn check(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => {
                if let Err(error) = self.store.clear_session() {
                    tracing::warn!("Failed to clear rejected session: {}", error);
                }
                tracing::info!("Session rejected by server; cleared stored token");
                Err(Error::Unauthorized)
            }
            StatusCode::FORBIDDEN => Err(Error::Forbidden(
                error_body::server_message(&body)
                    .unwrap_or_else(|| DEFAULT_FORBIDDEN_MESSAGE.to_string()),
            )),
            _ => Err(Error::Api {
                status: status.as_u16(),
                message: parse_api_error(status, &body),
            }),
        }
    }
}

fn multipart_form(fields: &[(&'static str, String)], files: &[UploadFile]) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(*name, value.clone());
    }
    for file in files {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)?;
        form = form.part(file.field.as_str(), part);
    }
    Ok(form)
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NotesResponse {
    #[serde(default, deserialize_with = "crate::models::notes_field")]
    notes: Vec<Note>,
}

#[cfg(test)]
mod tests;
