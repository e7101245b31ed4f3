use std::time::Duration;

use tracing::error;

use super::listing::ListMode;
use super::metadata::{AnalyzeFeatures, AnalyzeRequest, MetadataRecord, MetadataUpdate};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/metadata";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("error de conexión, compruebe su conexión a internet")]
    Network(#[source] reqwest::Error),
    #[error("error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("respuesta inesperada del servidor: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Outcome of a delete call. Deleting an already-deleted record is not a
/// failure; the server's 404 is remapped here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub already_deleted: bool,
}

/// Boundary component translating admin operations into REST calls against
/// the metadata service and HTTP failures into [`GatewayError`].
#[derive(Debug, Clone)]
pub struct MetadataGateway {
    http: reqwest::Client,
    base_url: String,
}

impl MetadataGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(translate_transport)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn list(&self, mode: ListMode) -> Result<Vec<MetadataRecord>, GatewayError> {
        let path = match mode {
            ListMode::Active => "active",
            ListMode::Inactive => "inactive",
        };
        let response = self
            .http
            .get(format!("{}/{path}", self.base_url))
            .send()
            .await
            .map_err(translate_transport)?;
        let response = require_success(response).await?;
        response.json().await.map_err(translate_transport)
    }

    pub async fn list_active(&self) -> Result<Vec<MetadataRecord>, GatewayError> {
        self.list(ListMode::Active).await
    }

    pub async fn list_inactive(&self) -> Result<Vec<MetadataRecord>, GatewayError> {
        self.list(ListMode::Inactive).await
    }

    /// Submits a source URL for ingestion. The response only echoes the
    /// request, so there is nothing useful to return.
    pub async fn create(&self, source_url: &str) -> Result<(), GatewayError> {
        let body = AnalyzeRequest {
            url: source_url.to_string(),
            features: AnalyzeFeatures::default(),
        };
        let response = self
            .http
            .post(format!("{}/analyze", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(translate_transport)?;
        require_success(response).await?;
        Ok(())
    }

    pub async fn update(&self, payload: &MetadataUpdate) -> Result<MetadataRecord, GatewayError> {
        let response = self
            .http
            .put(format!("{}/{}", self.base_url, payload.id))
            .json(payload)
            .send()
            .await
            .map_err(translate_transport)?;
        let response = require_success(response).await?;
        response.json().await.map_err(translate_transport)
    }

    pub async fn activate(&self, id: i64) -> Result<MetadataRecord, GatewayError> {
        let response = self
            .http
            .put(format!("{}/active/{id}", self.base_url))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(translate_transport)?;
        let response = require_success(response).await?;
        response.json().await.map_err(translate_transport)
    }

    /// The deactivate endpoint answers with either the updated record or a
    /// bare acknowledgement; callers get `None` for the latter and fall
    /// back to a full refresh.
    pub async fn deactivate(&self, id: i64) -> Result<Option<MetadataRecord>, GatewayError> {
        let response = self
            .http
            .delete(format!("{}/inactive/{id}", self.base_url))
            .send()
            .await
            .map_err(translate_transport)?;
        let response = require_success(response).await?;
        let body = response.text().await.map_err(translate_transport)?;
        Ok(serde_json::from_str(&body).ok())
    }

    pub async fn delete(&self, id: i64) -> Result<DeleteOutcome, GatewayError> {
        let response = self
            .http
            .delete(format!("{}/{id}", self.base_url))
            .send()
            .await
            .map_err(translate_transport)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome {
                already_deleted: true,
            });
        }
        require_success(response).await?;
        Ok(DeleteOutcome {
            already_deleted: false,
        })
    }
}

fn translate_transport(source: reqwest::Error) -> GatewayError {
    let translated = if source.is_decode() {
        GatewayError::Decode(source)
    } else {
        GatewayError::Network(source)
    };
    error!(error = %translated, "metadata request failed");
    translated
}

async fn require_success(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    let message = if message.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        message
    };
    let translated = GatewayError::Http {
        status: status.as_u16(),
        message,
    };
    error!(error = %translated, "metadata request rejected");
    Err(translated)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::{delete, get, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::core::metadata::{parse_authors, parse_feeds, ACTIVE_FLAG};

    #[derive(Clone, Default)]
    struct AppState {
        request_count: Arc<AtomicUsize>,
        last_body: Arc<Mutex<Option<Value>>>,
    }

    fn sample_record(id: i64, title: &str, active: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "publicationDate": "2024-03-05T09:30:00",
            "imageUrl": "https://example.com/cover.png",
            "feeds": "[{\"link\":\"https://example.com/feed\"}]",
            "authors": "[{\"name\":\"Ana\"}]",
            "active": active,
        })
    }

    async fn list_active_handler(State(state): State<AppState>) -> Json<Value> {
        state.request_count.fetch_add(1, Ordering::SeqCst);
        Json(json!([
            sample_record(2, "Segundo", "A"),
            sample_record(1, "Primero", "A"),
        ]))
    }

    async fn analyze_handler(
        State(state): State<AppState>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        state.request_count.fetch_add(1, Ordering::SeqCst);
        *state.last_body.lock().expect("lock should not be poisoned") = Some(body.clone());
        Json(body)
    }

    async fn update_handler(
        State(state): State<AppState>,
        Path(id): Path<i64>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        state.request_count.fetch_add(1, Ordering::SeqCst);
        let title = body["title"].as_str().unwrap_or_default();
        *state.last_body.lock().expect("lock should not be poisoned") = Some(body.clone());
        Json(sample_record(id, title, "A"))
    }

    async fn activate_handler(
        State(state): State<AppState>,
        Path(id): Path<i64>,
    ) -> impl IntoResponse {
        state.request_count.fetch_add(1, Ordering::SeqCst);
        if id == 500 {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "boom"})),
            )
                .into_response();
        }
        Json(sample_record(id, "Activado", "A")).into_response()
    }

    async fn deactivate_handler(
        State(state): State<AppState>,
        Path(id): Path<i64>,
    ) -> impl IntoResponse {
        state.request_count.fetch_add(1, Ordering::SeqCst);
        if id == 77 {
            // ack-only answer, no record echo
            return Json(json!({"success": true})).into_response();
        }
        Json(sample_record(id, "Desactivado", "I")).into_response()
    }

    async fn delete_handler(
        State(state): State<AppState>,
        Path(id): Path<i64>,
    ) -> impl IntoResponse {
        state.request_count.fetch_add(1, Ordering::SeqCst);
        match id {
            404 => (StatusCode::NOT_FOUND, "no such record".to_string()).into_response(),
            500 => (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()).into_response(),
            _ => Json(json!({"success": true})).into_response(),
        }
    }

    async fn spawn_server(state: AppState) -> (String, tokio::task::JoinHandle<()>) {
        let app = Router::new()
            .route("/metadata/active", get(list_active_handler))
            .route("/metadata/analyze", post(analyze_handler))
            .route("/metadata/{id}", put(update_handler).delete(delete_handler))
            .route("/metadata/active/{id}", put(activate_handler))
            .route("/metadata/inactive/{id}", delete(deactivate_handler))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        let join_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server should run");
        });
        (format!("http://{address}/metadata"), join_handle)
    }

    #[tokio::test]
    async fn list_active_decodes_camel_case_records() {
        let (base_url, server_task) = spawn_server(AppState::default()).await;
        let gateway = MetadataGateway::new(base_url).expect("gateway should build");

        let records = gateway.list_active().await.expect("list should succeed");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Segundo");
        assert_eq!(
            records[0].publication_date.as_deref(),
            Some("2024-03-05T09:30:00")
        );
        assert_eq!(
            records[0].image_url.as_deref(),
            Some("https://example.com/cover.png")
        );
        assert!(records[0].is_active());

        server_task.abort();
    }

    #[tokio::test]
    async fn delete_maps_404_to_an_idempotent_success() {
        let (base_url, server_task) = spawn_server(AppState::default()).await;
        let gateway = MetadataGateway::new(base_url).expect("gateway should build");

        let fresh = gateway.delete(1).await.expect("delete should succeed");
        assert!(!fresh.already_deleted);

        let repeated = gateway
            .delete(404)
            .await
            .expect("deleting an already-deleted record should succeed");
        assert!(repeated.already_deleted);

        server_task.abort();
    }

    #[tokio::test]
    async fn non_404_failures_surface_status_and_body() {
        let (base_url, server_task) = spawn_server(AppState::default()).await;
        let gateway = MetadataGateway::new(base_url).expect("gateway should build");

        let error = gateway
            .delete(500)
            .await
            .expect_err("server failure must propagate");
        match error {
            GatewayError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected http error, got {other:?}"),
        }

        server_task.abort();
    }

    #[tokio::test]
    async fn unreachable_server_translates_to_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        drop(listener);

        let gateway = MetadataGateway::new(format!("http://{address}/metadata"))
            .expect("gateway should build");
        let error = gateway
            .list_active()
            .await
            .expect_err("connection must fail");
        assert!(matches!(error, GatewayError::Network(_)));
    }

    #[tokio::test]
    async fn create_posts_the_analyze_payload_shape() {
        let state = AppState::default();
        let (base_url, server_task) = spawn_server(state.clone()).await;
        let gateway = MetadataGateway::new(base_url).expect("gateway should build");

        gateway
            .create("https://example.com/articulo")
            .await
            .expect("create should succeed");

        let body = state
            .last_body
            .lock()
            .expect("lock should not be poisoned")
            .clone()
            .expect("server should have seen a body");
        assert_eq!(body["url"], "https://example.com/articulo");
        assert_eq!(body["features"]["metadata"], json!({}));

        server_task.abort();
    }

    #[tokio::test]
    async fn update_sends_structured_lists_and_returns_the_record() {
        let state = AppState::default();
        let (base_url, server_task) = spawn_server(state.clone()).await;
        let gateway = MetadataGateway::new(base_url).expect("gateway should build");

        let payload = MetadataUpdate {
            id: 9,
            title: "Editado".to_string(),
            publication_date: Some("2024-03-05T10:00".to_string()),
            image_url: None,
            feeds: parse_feeds(r#"[{"link":"https://example.com/feed"}]"#).expect("feeds"),
            authors: parse_authors(r#"[{"name":"Ana"}]"#).expect("authors"),
            active: ACTIVE_FLAG.to_string(),
        };
        let updated = gateway.update(&payload).await.expect("update should succeed");
        assert_eq!(updated.id, 9);
        assert_eq!(updated.title, "Editado");

        let body = state
            .last_body
            .lock()
            .expect("lock should not be poisoned")
            .clone()
            .expect("server should have seen a body");
        assert!(body["feeds"].is_array());
        assert!(body["authors"].is_array());

        server_task.abort();
    }

    #[tokio::test]
    async fn deactivate_distinguishes_record_echo_from_bare_ack() {
        let (base_url, server_task) = spawn_server(AppState::default()).await;
        let gateway = MetadataGateway::new(base_url).expect("gateway should build");

        let echoed = gateway.deactivate(3).await.expect("deactivate should succeed");
        assert_eq!(echoed.map(|record| record.active), Some("I".to_string()));

        let ack_only = gateway.deactivate(77).await.expect("deactivate should succeed");
        assert!(ack_only.is_none());

        server_task.abort();
    }
}
