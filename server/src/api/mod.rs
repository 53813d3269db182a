//! Incident API routes
//!
//! Handlers here only translate between HTTP and the submission service.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, patch},
    Router,
};
use hazard_report_core::models::IncidentStatus;
use hazard_report_core::schema::FieldViolation;
use hazard_report_core::service::validate_idempotency_key;
use hazard_report_core::{SubmissionService, ViolationCode};
use serde_json::{json, Value};

use crate::error::ApiError;

/// Header carrying the client's idempotency key
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// The shared application state
pub struct AppState {
    /// Submission service over the process-wide store
    pub service: SubmissionService,
}

impl AppState {
    /// Wrap a submission service
    pub fn new(service: SubmissionService) -> Self {
        Self { service }
    }
}

/// Create the incident router with the specified state
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/incidents", get(list_incidents).post(create_incident))
        .route("/incidents/summary", get(get_summary))
        .route("/incidents/:id", get(get_incident))
        .route("/incidents/:id/status", patch(update_status))
        .with_state(state)
}

/// Unwrap a JSON body, turning axum's rejection into our error shape
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::PayloadTooLarge)
        }
        Err(rejection) => Err(ApiError::malformed_body(rejection.body_text())),
    }
}

/// Idempotency key from the request headers.
///
/// Bytes that are not visible ASCII are kept (lossily decoded) so the
/// service rejects them alongside any body violations.
fn idempotency_key(headers: &HeaderMap) -> Option<Cow<'_, str>> {
    headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
}

/// Submit a new incident
async fn create_incident(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let key = idempotency_key(&headers);
    let payload = match json_body(payload) {
        Ok(payload) => payload,
        Err(ApiError::InvalidData(mut details)) => {
            if let Some(Err(errors)) = key.as_deref().map(validate_idempotency_key) {
                details.extend_from_slice(errors.violations());
            }
            return Err(ApiError::InvalidData(details));
        }
        Err(e) => return Err(e),
    };

    let created = state
        .service
        .submit(&payload, key.as_deref())
        .map_err(|e| ApiError::from_core(e, "Failed to create incident"))?;

    let status = if created.is_new() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(json!({
            "success": true,
            "incident": created.incident().receipt(),
        })),
    ))
}

/// List all incidents, newest first
async fn list_incidents(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let incidents = state
        .service
        .list()
        .map_err(|e| ApiError::from_core(e, "Failed to fetch incidents"))?;

    Ok(Json(json!({ "success": true, "incidents": incidents })))
}

/// Dashboard summary
async fn get_summary(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .service
        .summary()
        .map_err(|e| ApiError::from_core(e, "Failed to summarize incidents"))?;

    Ok(Json(json!({ "success": true, "summary": summary })))
}

/// Get a specific incident
async fn get_incident(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let incident = state
        .service
        .get(&id)
        .map_err(|e| ApiError::from_core(e, "Failed to fetch incident"))?;

    Ok(Json(json!({ "success": true, "incident": incident })))
}

/// Move an incident along its lifecycle
async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(payload)?;

    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<IncidentStatus>().ok())
        .ok_or_else(|| {
            ApiError::InvalidData(vec![FieldViolation::new(
                "status",
                ViolationCode::InvalidEnumValue,
                "Expected 'pending' | 'investigating' | 'resolved'",
            )])
        })?;

    let incident = state
        .service
        .update_status(&id, status)
        .map_err(|e| ApiError::from_core(e, "Failed to update incident"))?;

    Ok(Json(json!({ "success": true, "incident": incident })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::{HeaderValue, Method, Request};
    use hazard_report_core::models::{Incident, NewIncident, NewUser, User};
    use hazard_report_core::store::{Created, IncidentStore, MemStorage};
    use hazard_report_core::{CoreError, IncidentSchema};
    use tower::ServiceExt;

    fn app_with_store(store: Arc<dyn IncidentStore>) -> Router {
        let config = ServerConfig::for_testing();
        let service = SubmissionService::new(store, IncidentSchema::new(config.core.validation.clone()));
        crate::build_app(Arc::new(AppState::new(service)), &config)
    }

    fn app() -> Router {
        app_with_store(Arc::new(MemStorage::new()))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn submit(app: &Router, body: Value) -> (StatusCode, Value) {
        send(app, json_request(Method::POST, "/api/incidents", &body)).await
    }

    /// Store whose every operation fails
    struct BrokenStore;

    fn broken<T>() -> hazard_report_core::Result<T> {
        Err(CoreError::Storage("connection reset".into()))
    }

    impl IncidentStore for BrokenStore {
        fn create_incident(&self, _data: NewIncident) -> hazard_report_core::Result<Incident> {
            broken()
        }
        fn create_incident_once(&self, _key: &str, _data: NewIncident) -> hazard_report_core::Result<Created> {
            broken()
        }
        fn get_incidents(&self) -> hazard_report_core::Result<Vec<Incident>> {
            broken()
        }
        fn get_incident(&self, _id: &str) -> hazard_report_core::Result<Option<Incident>> {
            broken()
        }
        fn update_incident_status(
            &self,
            _id: &str,
            _status: IncidentStatus,
        ) -> hazard_report_core::Result<Option<Incident>> {
            broken()
        }
        fn mark_email_sent(&self, _id: &str) -> hazard_report_core::Result<Option<Incident>> {
            broken()
        }
        fn incident_count(&self) -> hazard_report_core::Result<usize> {
            broken()
        }
        fn create_user(&self, _user: NewUser) -> hazard_report_core::Result<User> {
            broken()
        }
        fn get_user(&self, _id: &str) -> hazard_report_core::Result<Option<User>> {
            broken()
        }
        fn get_user_by_username(&self, _username: &str) -> hazard_report_core::Result<Option<User>> {
            broken()
        }
    }

    #[tokio::test]
    async fn test_submit_fetch_update_flow() {
        let app = app();

        let (status, body) = submit(
            &app,
            json!({
                "hazardType": "illegal-dumping",
                "description": "trash pile",
                "location": "Main St",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        let receipt = &body["incident"];
        assert_eq!(receipt["hazardType"], "illegal-dumping");
        assert_eq!(receipt["location"], "Main St");
        assert_eq!(receipt["status"], "pending");
        assert!(receipt["createdAt"].is_string());
        assert!(receipt.get("description").is_none());
        let id = receipt["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get_request(&format!("/api/incidents/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        let incident = &body["incident"];
        assert_eq!(incident["id"], id.as_str());
        assert_eq!(incident["description"], "trash pile");
        assert_eq!(incident["status"], "pending");
        assert!(incident["knownPlace"].is_null());
        assert!(incident["contactInfo"].is_null());
        assert!(incident["emailSent"].is_null());

        let (status, body) = send(
            &app,
            json_request(
                Method::PATCH,
                &format!("/api/incidents/{}/status", id),
                &json!({"status": "investigating"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["incident"]["status"], "investigating");

        let (_, body) = send(&app, get_request(&format!("/api/incidents/{}", id))).await;
        assert_eq!(body["incident"]["status"], "investigating");
    }

    #[tokio::test]
    async fn test_invalid_submission() {
        let app = app();

        let (status, body) = submit(&app, json!({"hazardType": "volcano"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid data");
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"hazardType"));
        assert!(fields.contains(&"description"));
        assert!(fields.contains(&"location"));

        let (_, body) = send(&app, get_request("/api/incidents")).await;
        assert_eq!(body["incidents"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_body() {
        let app = app();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/incidents")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid data");
        assert_eq!(body["details"][0]["field"], "body");
    }

    #[tokio::test]
    async fn test_oversized_body() {
        let app = app();
        let image = "A".repeat(ServerConfig::for_testing().max_body_bytes + 1);

        let (status, body) = submit(
            &app,
            json!({
                "hazardType": "other",
                "description": "d",
                "location": "l",
                "imageData": image,
            }),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "Payload too large");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let app = app();

        for location in ["first", "second", "third"] {
            let (status, _) = submit(
                &app,
                json!({"hazardType": "noise-pollution", "description": "d", "location": location}),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let (status, body) = send(&app, get_request("/api/incidents")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let locations: Vec<&str> = body["incidents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["location"].as_str().unwrap())
            .collect();
        assert_eq!(locations, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_unknown_incident() {
        let app = app();

        let (status, body) = send(&app, get_request("/api/incidents/nonexistent")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Incident not found"}));

        let (status, _) = send(
            &app,
            json_request(
                Method::PATCH,
                "/api/incidents/nonexistent/status",
                &json!({"status": "resolved"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_idempotent_resubmission() {
        let app = app();
        let body = json!({"hazardType": "sewage-spill", "description": "d", "location": "l"});

        let request = |body: &Value| {
            Request::builder()
                .method(Method::POST)
                .uri("/api/incidents")
                .header("content-type", "application/json")
                .header(IDEMPOTENCY_KEY_HEADER, "offline-7f3a")
                .body(Body::from(body.to_string()))
                .unwrap()
        };

        let (first_status, first) = send(&app, request(&body)).await;
        let (second_status, second) = send(&app, request(&body)).await;

        assert_eq!(first_status, StatusCode::CREATED);
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(first["incident"]["id"], second["incident"]["id"]);

        let (_, list) = send(&app, get_request("/api/incidents")).await;
        assert_eq!(list["incidents"].as_array().unwrap().len(), 1);
    }

    fn keyed_request(key: &[u8], body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/incidents")
            .header("content-type", "application/json")
            .header(IDEMPOTENCY_KEY_HEADER, HeaderValue::from_bytes(key).unwrap())
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn detail_fields(body: &Value) -> Vec<String> {
        body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_bad_key_and_bad_body_reported_together() {
        let app = app();

        let (status, body) = send(&app, keyed_request(b"has space", "{}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = detail_fields(&body);
        for field in ["hazardType", "description", "location", "Idempotency-Key"] {
            assert!(fields.iter().any(|f| f == field), "missing {} in {:?}", field, fields);
        }
    }

    #[tokio::test]
    async fn test_non_ascii_key_rejected_with_body_errors() {
        let app = app();

        let (status, body) =
            send(&app, keyed_request(&[0x6b, 0xe9], r#"{"hazardType": "volcano"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = detail_fields(&body);
        assert!(fields.iter().any(|f| f == "hazardType"));
        assert!(fields.iter().any(|f| f == "Idempotency-Key"));

        let (_, list) = send(&app, get_request("/api/incidents")).await;
        assert_eq!(list["incidents"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_bad_key_with_malformed_json() {
        let app = app();

        let (status, body) = send(&app, keyed_request(b"", "{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail_fields(&body), vec!["body", "Idempotency-Key"]);
    }

    #[tokio::test]
    async fn test_backward_status_change_rejected() {
        let app = app();
        let (_, body) = submit(
            &app,
            json!({"hazardType": "other", "description": "d", "location": "l", "status": "resolved"}),
        )
        .await;
        let id = body["incident"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            json_request(
                Method::PATCH,
                &format!("/api/incidents/{}/status", id),
                &json!({"status": "pending"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Invalid status transition");
        assert_eq!(body["from"], "resolved");
        assert_eq!(body["to"], "pending");
    }

    #[tokio::test]
    async fn test_invalid_status_body() {
        let app = app();
        let (_, body) = submit(
            &app,
            json!({"hazardType": "other", "description": "d", "location": "l"}),
        )
        .await;
        let id = body["incident"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            json_request(
                Method::PATCH,
                &format!("/api/incidents/{}/status", id),
                &json!({"status": "closed"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "status");
    }

    #[tokio::test]
    async fn test_summary() {
        let app = app();
        for hazard in ["deforestation", "deforestation", "air-pollution"] {
            submit(&app, json!({"hazardType": hazard, "description": "d", "location": "l"})).await;
        }

        let (status, body) = send(&app, get_request("/api/incidents/summary")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["total"], 3);
        assert_eq!(body["summary"]["byStatus"]["pending"], 3);
        assert_eq!(body["summary"]["byHazardType"][0]["hazardType"], "deforestation");
        assert_eq!(body["summary"]["byHazardType"][0]["count"], 2);
    }

    #[tokio::test]
    async fn test_storage_failures_are_generic() {
        let app = app_with_store(Arc::new(BrokenStore));

        let (status, body) = submit(
            &app,
            json!({"hazardType": "other", "description": "d", "location": "l"}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to create incident"}));

        let (status, body) = send(&app, get_request("/api/incidents")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to fetch incidents"}));

        let (status, body) = send(&app, get_request("/api/incidents/abc")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to fetch incident"}));
    }

    #[tokio::test]
    async fn test_validation_still_reported_with_broken_store() {
        let app = app_with_store(Arc::new(BrokenStore));

        let (status, body) = submit(&app, json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"].as_array().unwrap().len(), 3);
    }
}
