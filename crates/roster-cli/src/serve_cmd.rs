//! `roster serve`: a read-only local web view of the roster.
//!
//! State is loaded from the store on every request, so edits made with the
//! CLI or dashboard show up on the next page load.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use roster_core::AppState;
use roster_core::export;
use roster_core::print::{escape_html, render_html, session_count_label};
use roster_core::view::{DayGroup, FilterCandidates, ScheduleFilter, apply_filter, filter_candidates, group_by_day};
use roster_store::{KeyValueStore, records};

const PAGE_TITLE: &str = "Training Roster";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `?starter=` / `?mentor=`; a starter filter wins when both are given.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub starter: Option<String>,
    pub mentor: Option<String>,
}

impl FilterQuery {
    fn filter(&self) -> ScheduleFilter {
        ScheduleFilter::from_options(
            self.starter.as_deref().filter(|s| !s.is_empty()),
            self.mentor.as_deref().filter(|s| !s.is_empty()),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse<'a> {
    pub filter: String,
    pub count: usize,
    pub total: usize,
    pub days: Vec<DayGroup<'a>>,
}

#[derive(Debug, Serialize)]
pub struct FiltersResponse {
    #[serde(flatten)]
    pub candidates: FilterCandidates,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

type SharedStore = Arc<dyn KeyValueStore>;

pub fn build_router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/print", get(print_page))
        .route("/api/roster", get(get_roster))
        .route("/api/schedule", get(get_schedule))
        .route("/api/filters", get(get_filters))
        .route("/api/export.csv", get(get_export))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(store: SharedStore, bind: &str, port: u16) -> Result<()> {
    let app = build_router(store);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("roster serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("roster serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn load(store: &SharedStore) -> AppState {
    records::load_all(store.as_ref()).into()
}

async fn index(State(store): State<SharedStore>, Query(query): Query<FilterQuery>) -> Response {
    let state = load(&store);
    let filter = query.filter();
    let candidates = filter_candidates(&state.schedule);

    let links = |kind: &str, names: &[String]| -> String {
        names
            .iter()
            .map(|n| {
                let encoded = urlencoding::encode(n);
                let escaped = escape_html(n);
                format!("<a href=\"/?{kind}={encoded}\">{escaped}</a>")
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    let nav = format!(
        "<nav><a href=\"/\">All</a> | Trainees: {} | Mentors: {} | \
         <a href=\"/print\">Print</a> | <a href=\"/api/export.csv\">Export CSV</a></nav>",
        links("starter", &candidates.starters),
        links("mentor", &candidates.mentors),
    );

    let page = render_html(&state.schedule, &filter, PAGE_TITLE);
    let page = page.replacen("<body>", &format!("<body>{nav}"), 1);
    Html(page).into_response()
}

async fn print_page(State(store): State<SharedStore>, Query(query): Query<FilterQuery>) -> Response {
    let state = load(&store);
    Html(render_html(&state.schedule, &query.filter(), PAGE_TITLE)).into_response()
}

async fn get_roster(State(store): State<SharedStore>) -> Response {
    Json(load(&store)).into_response()
}

async fn get_schedule(
    State(store): State<SharedStore>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let state = load(&store);
    let filter = query.filter();
    let shown = apply_filter(&state.schedule, &filter);
    let count = shown.len();
    Json(ScheduleResponse {
        filter: filter.label(),
        count,
        total: state.schedule.len(),
        days: group_by_day(shown),
    })
    .into_response()
}

async fn get_filters(State(store): State<SharedStore>) -> Response {
    let state = load(&store);
    Json(FiltersResponse {
        candidates: filter_candidates(&state.schedule),
    })
    .into_response()
}

async fn get_export(State(store): State<SharedStore>) -> Result<Response, AppError> {
    let state = load(&store);
    let csv = export::to_csv(&state.schedule)
        .ok_or_else(|| AppError::not_found("no schedule generated"))?;
    tracing::debug!(summary = %session_count_label(state.schedule.len()), "serving export");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"training_roster.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use roster_store::{MemoryStore, RecordKey};
    use roster_test_utils::sample_schedule;

    use super::SharedStore;

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    fn store_with_schedule() -> SharedStore {
        let store: SharedStore = Arc::new(MemoryStore::new());
        roster_store::records::save(store.as_ref(), RecordKey::Schedule, &sample_schedule())
            .unwrap();
        store
    }

    async fn send_request(store: SharedStore, uri: &str) -> axum::response::Response {
        let app = super::build_router(store);
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_index_returns_html() {
        let resp = send_request(store_with_schedule(), "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp
            .headers()
            .get("content-type")
            .expect("should have content-type header")
            .to_str()
            .unwrap()
            .to_owned();
        assert!(
            content_type.contains("text/html"),
            "content-type should contain text/html, got: {content_type}"
        );
        let html = body_string(resp).await;
        assert!(html.contains("5 Sessions"));
        assert!(html.contains("href=\"/?starter=John%20Doe\""));
    }

    #[tokio::test]
    async fn test_index_empty_state() {
        let resp = send_request(Arc::new(MemoryStore::new()), "/").await;
        let html = body_string(resp).await;
        assert!(html.contains("No Schedule Generated"));
    }

    #[tokio::test]
    async fn test_roster_defaults_on_empty_store() {
        let resp = send_request(Arc::new(MemoryStore::new()), "/api/roster").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["starters"].as_array().unwrap().len(), 2);
        assert_eq!(json["mentors"][0]["name"], "Dr. Emily White");
        assert_eq!(json["modules"][0]["requiredExpertise"], "Safety");
        assert_eq!(json["schedule"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_schedule_grouped_and_filtered() {
        let resp = send_request(store_with_schedule(), "/api/schedule?starter=John%20Doe").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["count"], 2);
        assert_eq!(json["total"], 5);
        assert_eq!(json["filter"], "trainee: John Doe");
        let days: Vec<&str> = json["days"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["day"].as_str().unwrap())
            .collect();
        assert_eq!(days, ["Monday", "Tuesday"]);
        assert_eq!(json["days"][0]["sessions"][0]["id"], "s2");
    }

    #[tokio::test]
    async fn test_schedule_unfiltered_order() {
        let resp = send_request(store_with_schedule(), "/api/schedule").await;
        let json = body_json(resp).await;
        assert_eq!(json["count"], 5);
        let monday = json["days"][0]["sessions"].as_array().unwrap();
        assert_eq!(monday[0]["id"], "s3");
        assert_eq!(monday[1]["id"], "s2");
    }

    #[tokio::test]
    async fn test_filters_lists_distinct_names() {
        let resp = send_request(store_with_schedule(), "/api/filters").await;
        let json = body_json(resp).await;
        assert_eq!(
            json["starters"],
            serde_json::json!(["John Doe", "Sarah Connor"])
        );
        assert_eq!(json["mentors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let resp = send_request(store_with_schedule(), "/api/export.csv").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        assert!(disposition.contains("training_roster.csv"));
        let csv = body_string(resp).await;
        assert!(csv.starts_with("Day,Time,Trainee,Mentor,Module,Location\n"));
        assert_eq!(csv.lines().count(), 6);
    }

    #[tokio::test]
    async fn test_export_empty_is_not_found() {
        let resp = send_request(Arc::new(MemoryStore::new()), "/api/export.csv").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_index_links_are_encoded_and_escaped() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let schedule = vec![roster_test_utils::schedule_item(
            "s1",
            "Monday",
            "09:00 - 10:00",
            "Pat O'Brien & Co",
            "Dr. Emily White",
            "Research Ethics",
            None,
        )];
        roster_store::records::save(store.as_ref(), RecordKey::Schedule, &schedule).unwrap();

        let html = body_string(send_request(store, "/").await).await;
        assert!(html.contains("href=\"/?starter=Pat%20O%27Brien%20%26%20Co\""));
        assert!(html.contains(">Pat O&#39;Brien &amp; Co</a>"));
        assert!(html.contains("href=\"/?mentor=Dr.%20Emily%20White\""));
    }
}
