//! Route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::health::HealthReport;
use crate::http::response::ErrorBody;
use crate::http::server::AppState;
use crate::proxy::{ProxyError, ProxyResponse};

/// Body of `GET /` without a `url` parameter.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub usage: &'static str,
    pub allowed_domains: Vec<String>,
    pub aliases: Vec<String>,
}

fn url_param(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(k, _)| k == "url")
        .map(|(_, v)| v.as_str())
}

/// `GET /`: service info, or the generic proxy when `url` is given.
pub async fn root(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    if url_param(&params).is_some() {
        return proxy(State(state), Query(params)).await.into_response();
    }

    Json(ServiceInfo {
        message: "NBKR CORS Proxy",
        version: env!("CARGO_PKG_VERSION"),
        usage: "/proxy?url=https://nbkr.kg/XML/daily.xml",
        allowed_domains: state.proxy.policy().domains().to_vec(),
        aliases: state.proxy.alias_names().map(String::from).collect(),
    })
    .into_response()
}

/// `GET /proxy?url=...`
pub async fn proxy(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<ProxyResponse, ProxyError> {
    state.proxy.handle_proxy(url_param(&params), &params).await
}

/// `GET /nbkr/{alias}`
pub async fn alias(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ProxyResponse, ProxyError> {
    state.proxy.handle_alias(&name).await
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health.check().await)
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            detail: "Not Found".to_string(),
        }),
    )
}
