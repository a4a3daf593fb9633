// 🌐 HTTP surface - form submission + registration search
// Built as a library module so the router can be exercised in tests

use crate::club::Club;
use crate::config::Config;
use crate::registration::Registration;
use crate::store::{RegistrationStore, StoreError};
use crate::validator::{validate, ValidationError};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<RegistrationStore>>,
    intake_path: Arc<str>,
}

impl AppState {
    pub fn new(store: RegistrationStore, intake_path: &str) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            intake_path: Arc::from(intake_path),
        }
    }

    fn store(&self) -> MutexGuard<'_, RegistrationStore> {
        // A panic mid-request can't leave the store half-updated, so a poisoned lock is still usable
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    fn fail(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            errors,
        }
    }
}

/// Registration as shown to clients, numbered by insertion order
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RegistrationResponse {
    pub id: usize,
    pub name: String,
    pub email: String,
    pub club: String,
    pub club_label: String,
    pub date: String,
}

impl From<(usize, &Registration)> for RegistrationResponse {
    fn from((id, reg): (usize, &Registration)) -> Self {
        Self {
            id,
            name: reg.name.clone(),
            email: reg.email.clone(),
            club: reg.club.id().to_string(),
            club_label: reg.club.label().to_string(),
            date: reg.date_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub registration: RegistrationResponse,
    pub registrations: Vec<RegistrationResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClubResponse {
    pub id: String,
    pub label: String,
}

impl From<Club> for ClubResponse {
    fn from(club: Club) -> Self {
        Self {
            id: club.id().to_string(),
            label: club.label().to_string(),
        }
    }
}

/// Raw form fields; anything missing is treated as blank
#[derive(Debug, Deserialize)]
pub struct SubmissionForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub club: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/clubs - Allowed clubs with their display labels
async fn list_clubs() -> impl IntoResponse {
    let clubs: Vec<ClubResponse> = Club::ALL.into_iter().map(ClubResponse::from).collect();
    Json(ApiResponse::ok(clubs))
}

/// GET /api/registrations?search=... - Matching registrations, all when blank
async fn search_registrations(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let store = state.store();

    let response: Vec<RegistrationResponse> = store
        .search_numbered(&params.search)
        .into_iter()
        .map(RegistrationResponse::from)
        .collect();

    Json(ApiResponse::ok(response))
}

/// POST /register - Validate, store, return the new entry plus the full list
async fn submit_registration(
    State(state): State<AppState>,
    Form(form): Form<SubmissionForm>,
) -> Response {
    let new = match validate(&form.name, &form.email, &form.club) {
        Ok(new) => new,
        Err(errors) => {
            info!(count = errors.len(), "submission rejected");
            let messages = errors.iter().map(ValidationError::message).collect();
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<SubmissionResponse>::fail(messages)),
            )
                .into_response();
        }
    };

    let mut store = state.store();

    let id = store.len() + 1;
    let registration = match store.append(new) {
        Ok(stored) => RegistrationResponse::from((id, stored)),
        Err(e) => return store_failure(e),
    };

    let registrations: Vec<RegistrationResponse> = store
        .search_numbered("")
        .into_iter()
        .map(RegistrationResponse::from)
        .collect();

    info!(id = registration.id, club = %registration.club, "registration stored");

    (
        StatusCode::CREATED,
        Json(ApiResponse::ok(SubmissionResponse {
            registration,
            registrations,
        })),
    )
        .into_response()
}

/// Anything but POST on /register goes back to the intake page
async fn redirect_to_intake(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.intake_path)
}

fn store_failure(e: StoreError) -> Response {
    error!("Error storing registration: {}", e);
    let status = if e.is_persistence() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ApiResponse::<SubmissionResponse>::fail(vec![
            "Registration could not be saved, please try again later".to_string(),
        ])),
    )
        .into_response()
}

// ============================================================================
// Router
// ============================================================================

/// Full application router: API routes, the submission endpoint, and the
/// static intake page as fallback.
pub fn router(state: AppState, config: &Config) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/clubs", get(list_clubs))
        .route("/registrations", get(search_registrations))
        .with_state(state.clone());

    Router::new()
        .route(
            "/register",
            post(submit_registration).fallback(redirect_to_intake),
        )
        .with_state(state)
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde::de::DeserializeOwned;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app(dir: &TempDir) -> (Router, AppState) {
        let config = Config {
            data_file: dir.path().join("registrations.json"),
            static_dir: dir.path().join("web"),
            ..Config::default()
        };
        let state = AppState::new(RegistrationStore::open(&config.data_file), &config.intake_path);
        (router(state.clone(), &config), state)
    }

    fn form_post(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);

        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: ApiResponse<String> = read_json(response).await;
        assert!(body.success);
        assert_eq!(body.data.as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn test_valid_submission_is_stored() {
        let dir = TempDir::new().unwrap();
        let (app, state) = test_app(&dir);

        let response = app
            .oneshot(form_post("name=Alice+Liddell&email=alice%40example.com&club=music"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: ApiResponse<SubmissionResponse> = read_json(response).await;
        let data = body.data.unwrap();
        assert_eq!(data.registration.id, 1);
        assert_eq!(data.registration.name, "Alice Liddell");
        assert_eq!(data.registration.club_label, "Music Club");
        assert_eq!(data.registrations.len(), 1);

        assert_eq!(state.store().len(), 1);
        let on_disk = RegistrationStore::open(dir.path().join("registrations.json"));
        assert_eq!(on_disk.all()[0].email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_submission_returns_full_list() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);

        app.clone()
            .oneshot(form_post("name=Alice&email=a%40b.com&club=art"))
            .await
            .unwrap();
        let response = app
            .oneshot(form_post("name=Bob+Stone&email=bob%40b.com&club=drama"))
            .await
            .unwrap();

        let body: ApiResponse<SubmissionResponse> = read_json(response).await;
        let data = body.data.unwrap();
        assert_eq!(data.registration.id, 2);
        let ids: Vec<usize> = data.registrations.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_invalid_submission_lists_errors() {
        let dir = TempDir::new().unwrap();
        let (app, state) = test_app(&dir);

        let response = app
            .oneshot(form_post("name=Al&email=nope&club=chess"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: ApiResponse<SubmissionResponse> = read_json(response).await;
        assert!(!body.success);
        assert_eq!(
            body.errors,
            vec![
                "Name must be at least 3 characters".to_string(),
                "Please enter a valid email address".to_string(),
                "Please select a valid club".to_string(),
            ]
        );
        assert!(state.store().is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields_count_as_blank() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);

        let response = app.oneshot(form_post("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: ApiResponse<SubmissionResponse> = read_json(response).await;
        assert_eq!(body.errors.len(), 3);
    }

    #[tokio::test]
    async fn test_get_on_register_redirects() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);

        let response = app
            .oneshot(Request::get("/register").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/index.html"
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_unwritable_store_is_service_unavailable() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let config = Config::default();
        let state = AppState::new(
            RegistrationStore::open(blocker.join("registrations.json")),
            &config.intake_path,
        );
        let app = router(state.clone(), &config);

        let response = app
            .oneshot(form_post("name=Alice&email=a%40b.com&club=art"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(state.store().is_empty());
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);

        for body in [
            "name=Alice&email=a%40b.com&club=music",
            "name=Bob+Stone&email=bob%40b.com&club=sports",
            "name=Carol&email=carol%40c.org&club=music",
        ] {
            app.clone().oneshot(form_post(body)).await.unwrap();
        }

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/registrations?search=MUSIC")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body: ApiResponse<Vec<RegistrationResponse>> = read_json(response).await;
        let ids: Vec<usize> = body.data.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let response = app
            .clone()
            .oneshot(Request::get("/api/registrations").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: ApiResponse<Vec<RegistrationResponse>> = read_json(response).await;
        assert_eq!(body.data.unwrap().len(), 3);

        let response = app
            .oneshot(
                Request::get("/api/registrations?search=zzz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body: ApiResponse<Vec<RegistrationResponse>> = read_json(response).await;
        assert!(body.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clubs_endpoint() {
        let dir = TempDir::new().unwrap();
        let (app, _) = test_app(&dir);

        let response = app
            .oneshot(Request::get("/api/clubs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: ApiResponse<Vec<ClubResponse>> = read_json(response).await;
        let ids: Vec<String> = body.data.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["programming", "art", "sports", "music", "drama"]);
    }

    #[tokio::test]
    async fn test_static_fallback_serves_intake_page() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("web")).unwrap();
        fs::write(dir.path().join("web").join("index.html"), "<form></form>").unwrap();
        let (app, _) = test_app(&dir);

        let response = app
            .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<form></form>");
    }
}
