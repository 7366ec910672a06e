use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{BillRepository, CategoryRepository, RepoError, RepoResult, Store};
use crate::models::{Bill, Category};

pub(crate) const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the finance REST backend. One blocking request per call.
#[derive(Debug, Clone)]
pub(crate) struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> RepoResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub(crate) fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send the request and return the body of a successful response.
    fn execute(
        &self,
        request: RequestBuilder,
        entity: &'static str,
        id: Option<i64>,
    ) -> RepoResult<String> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        tracing::debug!(%status, entity, "backend responded");
        check_status(status, &body, entity, id)?;
        Ok(body)
    }

    fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        entity: &'static str,
        key: &str,
    ) -> RepoResult<Vec<T>> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let body = self.execute(self.client.get(&url), entity, None)?;
        decode_list(&body, key)
    }
}

/// Map a non-success status to a typed error, pulling the backend's
/// `message` (or `error`) field out of the body when there is one.
pub(crate) fn check_status(
    status: StatusCode,
    body: &str,
    entity: &'static str,
    id: Option<i64>,
) -> RepoResult<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(RepoError::NotFound { entity, id });
        }
    }
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|err| err.message.or(err.error))
        .unwrap_or_else(|| {
            let snippet: String = body.trim().chars().take(200).collect();
            if snippet.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                snippet
            }
        });
    tracing::warn!(%status, entity, %message, "backend rejected request");
    Err(RepoError::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// Decode a single entity. Accepts the bare object or one wrapped in
/// `{"<key>": {...}}` / `{"data": {...}}`.
pub(crate) fn decode_entity<T: DeserializeOwned>(body: &str, key: &str) -> RepoResult<T> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let inner = unwrap_envelope(value, key, serde_json::Value::is_object);
    Ok(serde_json::from_value(inner)?)
}

/// Decode a list. Accepts a bare array or one wrapped like [`decode_entity`].
pub(crate) fn decode_list<T: DeserializeOwned>(body: &str, key: &str) -> RepoResult<Vec<T>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let inner = unwrap_envelope(value, key, serde_json::Value::is_array);
    Ok(serde_json::from_value(inner)?)
}

fn unwrap_envelope(
    mut value: serde_json::Value,
    key: &str,
    wanted: fn(&serde_json::Value) -> bool,
) -> serde_json::Value {
    for k in [key, "data"] {
        if let Some(inner) = value.get_mut(k).filter(|v| wanted(v)) {
            return inner.take();
        }
    }
    value
}

impl CategoryRepository for HttpStore {
    fn list(&self, user_id: i64) -> RepoResult<Vec<Category>> {
        self.get_list(&format!("get-categories/{user_id}"), "category", "categories")
    }

    fn create(&self, category: &Category) -> RepoResult<Category> {
        let url = self.url("add-category");
        tracing::debug!(%url, name = %category.name, "POST");
        let body = self.execute(self.client.post(&url).json(category), "category", None)?;
        decode_entity(&body, "category")
    }

    fn update(&self, category: &Category) -> RepoResult<Category> {
        let id = category.id.ok_or(RepoError::MissingId("category"))?;
        let url = self.url(&format!("update-category/{id}"));
        tracing::debug!(%url, "PUT");
        let body = self.execute(self.client.put(&url).json(category), "category", Some(id))?;
        // Some endpoints answer with a bare status message
        match decode_entity(&body, "category") {
            Ok(updated) => Ok(updated),
            Err(RepoError::Decode(err)) => {
                tracing::debug!(%err, "update response carried no category, keeping local copy");
                Ok(category.clone())
            }
            Err(other) => Err(other),
        }
    }

    fn delete(&self, id: i64) -> RepoResult<()> {
        let url = self.url(&format!("delete-category/{id}"));
        tracing::debug!(%url, "DELETE");
        self.execute(self.client.delete(&url), "category", Some(id))?;
        Ok(())
    }
}

impl BillRepository for HttpStore {
    fn list_bills(&self, user_id: i64) -> RepoResult<Vec<Bill>> {
        self.get_list(&format!("get-bills/{user_id}"), "bill", "bills")
    }

    fn create_bill(&self, bill: &Bill) -> RepoResult<Bill> {
        let url = self.url("add-bill");
        tracing::debug!(%url, "POST");
        let body = self.execute(self.client.post(&url).json(bill), "bill", None)?;
        decode_entity(&body, "bill")
    }

    fn update_bill(&self, bill: &Bill) -> RepoResult<Bill> {
        let id = bill.id.ok_or(RepoError::MissingId("bill"))?;
        let url = self.url(&format!("update-bill/{id}"));
        tracing::debug!(%url, "PUT");
        let body = self.execute(self.client.put(&url).json(bill), "bill", Some(id))?;
        match decode_entity(&body, "bill") {
            Ok(updated) => Ok(updated),
            Err(RepoError::Decode(err)) => {
                tracing::debug!(%err, "update response carried no bill, keeping local copy");
                Ok(bill.clone())
            }
            Err(other) => Err(other),
        }
    }

    fn delete_bill(&self, id: i64) -> RepoResult<()> {
        let url = self.url(&format!("delete-bill/{id}"));
        tracing::debug!(%url, "DELETE");
        self.execute(self.client.delete(&url), "bill", Some(id))?;
        Ok(())
    }
}

impl Store for HttpStore {
    fn describe(&self) -> String {
        format!("remote {}", self.base_url())
    }
}
