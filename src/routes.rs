use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::{mpsc, oneshot};
use tower_http::services::ServeDir;

use crate::actor::AppActorMessage;
use crate::commands::{self, MenuAction, MenuEntry, MenuOutcome, StatusSnapshot};
use crate::domain::Preferences;

type ApiError = (StatusCode, String);

pub fn router(tx: mpsc::Sender<AppActorMessage>, macros_dir: &std::path::Path) -> Router {
    let api = Router::new()
        .route("/menu", get(list_menu))
        .route("/menu/:id", post(activate_menu))
        .route("/status", get(get_status))
        .route("/preferences", get(get_preferences).put(put_preferences))
        .layer(middleware::from_fn(set_no_store_headers))
        .with_state(tx);

    api.nest_service("/macros", ServeDir::new(macros_dir))
}

async fn ask<T>(
    tx: &mpsc::Sender<AppActorMessage>,
    message: impl FnOnce(oneshot::Sender<T>) -> AppActorMessage,
) -> Result<T, ApiError> {
    let (reply, response) = oneshot::channel();
    tx.send(message(reply))
        .await
        .map_err(|_| unavailable())?;
    response.await.map_err(|_| unavailable())
}

fn unavailable() -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Notifier is shutting down".to_string(),
    )
}

async fn list_menu() -> Json<Vec<MenuEntry>> {
    Json(commands::menu())
}

async fn activate_menu(
    State(tx): State<mpsc::Sender<AppActorMessage>>,
    Path(id): Path<String>,
) -> Result<Json<MenuOutcome>, ApiError> {
    let action = MenuAction::from_id(&id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown menu action {}", id)))?;
    ask(&tx, |reply| AppActorMessage::Menu { action, reply })
        .await?
        .map(Json)
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))
}

async fn get_status(
    State(tx): State<mpsc::Sender<AppActorMessage>>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    ask(&tx, |reply| AppActorMessage::GetStatus { reply })
        .await
        .map(Json)
}

async fn get_preferences(
    State(tx): State<mpsc::Sender<AppActorMessage>>,
) -> Result<Json<Preferences>, ApiError> {
    ask(&tx, |reply| AppActorMessage::GetStatus { reply })
        .await
        .map(|snapshot| Json(snapshot.preferences))
}

async fn put_preferences(
    State(tx): State<mpsc::Sender<AppActorMessage>>,
    Json(preferences): Json<Preferences>,
) -> Result<Json<Preferences>, ApiError> {
    ask(&tx, |reply| AppActorMessage::SetPreferences { preferences, reply })
        .await?
        .map(Json)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}

async fn set_no_store_headers(request: Request, next: Next) -> impl IntoResponse {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{self, AppActor};
    use crate::commands::tests::test_state;
    use axum::body::Body;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app() -> (Router, TempDir) {
        let (state, macros) = test_state("http://www.mspaintadventures.com/?s=6&p=001902");
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(actor::run(AppActor::new(state, rx)));
        (router(tx, macros.path()), macros)
    }

    async fn call(method: &str, uri: &str, body: Body) -> axum::response::Response {
        let (app, _macros) = app();
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn check_now_over_http() {
        let response = call("POST", "/menu/check", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn unknown_menu_action_is_not_found() {
        let response = call("POST", "/menu/launch-rockets", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn out_of_range_preferences_are_rejected() {
        let body = Body::from(r#"{"check_interval_minutes":5,"sound":true}"#);
        let response = call("PUT", "/preferences", body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn macros_are_served() {
        let response = call("GET", "/macros/a.png", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
