use axum::{
    Extension, Json, Router,
    body::{Body, Bytes},
    extract::{OriginalUri, Query},
    http::{HeaderMap, Method, StatusCode, Uri, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::peer::ForwardedResponse;
use super::protocol::*;
use super::router::{Route, ShardRouter};
use crate::error::{ForwardingError, KvError, StorageError};

/// HTTP surface of a node.
pub fn build_router(router: Arc<ShardRouter>) -> Router {
    Router::new()
        .route(ENDPOINT_GET, get(handle_get).post(handle_get))
        .route(ENDPOINT_SET, get(handle_set).post(handle_set))
        .route(ENDPOINT_DELETE, get(handle_delete).post(handle_delete))
        .route(ENDPOINT_PURGE, post(handle_purge))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(Extension(router))
}

enum Dispatch {
    Local(String),
    Done(Response),
}

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A key request as received: parameters come from the query string and, for form
/// posts, from the body. The raw parts are kept so the request can be replayed.
struct KeyRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: KeyParams,
}

impl KeyRequest {
    /// Form body values win over query values, like a classic form parser.
    fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        query: KeyParams,
        body: Bytes,
    ) -> Result<Self, Response> {
        let mut params = query;
        if is_form(&headers) && !body.is_empty() {
            let form: KeyParams = serde_urlencoded::from_bytes(&body).map_err(|e| {
                error_response(StatusCode::BAD_REQUEST, format!("invalid form body: {}", e))
            })?;
            params.key = form.key.or(params.key);
            params.value = form.value.or(params.value);
        }

        Ok(Self {
            method,
            uri,
            headers,
            body,
            params,
        })
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE))
}

pub async fn handle_get(
    Extension(router): Extension<Arc<ShardRouter>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(query): Query<KeyParams>,
    body: Bytes,
) -> Response {
    let request = match KeyRequest::new(method, uri, headers, query, body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let key = match dispatch(&router, &request).await {
        Dispatch::Local(key) => key,
        Dispatch::Done(response) => return response,
    };

    let value = match router.get_local(&key).await {
        Ok(value) => value,
        Err(e) => return storage_failure(&router, e),
    };
    let value = match value.map(String::from_utf8).transpose() {
        Ok(value) => value,
        Err(_) => return storage_failure(&router, StorageError::InvalidValue(key)),
    };

    tracing::debug!("GET: {:?} served locally (found={})", key, value.is_some());
    served(
        &router,
        GetResponse {
            key,
            found: value.is_some(),
            value,
            shard: router.current_index(),
        },
    )
}

pub async fn handle_set(
    Extension(router): Extension<Arc<ShardRouter>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(query): Query<KeyParams>,
    body: Bytes,
) -> Response {
    let request = match KeyRequest::new(method, uri, headers, query, body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let key = match dispatch(&router, &request).await {
        Dispatch::Local(key) => key,
        Dispatch::Done(response) => return response,
    };
    let Some(value) = request.params.value else {
        return error_response(StatusCode::BAD_REQUEST, "missing value parameter");
    };

    if let Err(e) = router.set_local(&key, value.as_bytes()).await {
        return storage_failure(&router, e);
    }

    tracing::debug!("SET: {:?} stored locally", key);
    served(
        &router,
        WriteResponse {
            key,
            shard: router.current_index(),
            success: true,
        },
    )
}

pub async fn handle_delete(
    Extension(router): Extension<Arc<ShardRouter>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(query): Query<KeyParams>,
    body: Bytes,
) -> Response {
    let request = match KeyRequest::new(method, uri, headers, query, body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let key = match dispatch(&router, &request).await {
        Dispatch::Local(key) => key,
        Dispatch::Done(response) => return response,
    };

    if let Err(e) = router.delete_local(&key).await {
        return storage_failure(&router, e);
    }

    tracing::debug!("DELETE: {:?} removed locally", key);
    served(
        &router,
        WriteResponse {
            key,
            shard: router.current_index(),
            success: true,
        },
    )
}

pub async fn handle_purge(Extension(router): Extension<Arc<ShardRouter>>) -> Response {
    match router.purge().await {
        Ok(report) => {
            let status = if report.is_complete() {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            with_served_by(&router, status, Json(report))
        }
        Err(e) => kv_failure(&router, e),
    }
}

pub async fn handle_health(Extension(router): Extension<Arc<ShardRouter>>) -> Response {
    let keys = match router.len_local().await {
        Ok(keys) => keys,
        Err(e) => return storage_failure(&router, e),
    };
    let table = router.table();
    served(
        &router,
        HealthResponse {
            name: table.current_name().to_string(),
            shard: table.current_index(),
            count: table.count(),
            keys,
        },
    )
}

/// Decides whether the request is served here. Remote keys are forwarded and the
/// owner's answer is relayed as is.
async fn dispatch(router: &ShardRouter, request: &KeyRequest) -> Dispatch {
    let key = match &request.params.key {
        Some(key) if !key.is_empty() => key.clone(),
        _ => {
            return Dispatch::Done(error_response(
                StatusCode::BAD_REQUEST,
                "missing key parameter",
            ));
        }
    };

    let shard = match router.route(&key) {
        Route::Local => return Dispatch::Local(key),
        Route::Remote(shard) => shard,
    };

    // A forwarded request must land on the owner. If it did not, the shard tables disagree.
    if hop_count(&request.headers) > 0 {
        tracing::warn!(
            "Refusing second hop for {:?}: shard {} believes shard {} owns it",
            key,
            router.current_index(),
            shard
        );
        return Dispatch::Done(error_response(
            StatusCode::MISDIRECTED_REQUEST,
            format!(
                "key {:?} was forwarded to shard {} but resolves to shard {}; shard tables are inconsistent",
                key,
                router.current_index(),
                shard
            ),
        ));
    }

    let Some(path_and_query) = request.uri.path_and_query() else {
        return Dispatch::Done(error_response(StatusCode::BAD_REQUEST, "missing request path"));
    };
    let request_id = request
        .headers
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match router
        .forward(
            shard,
            request.method.clone(),
            path_and_query.as_str(),
            request.headers.get(CONTENT_TYPE).cloned(),
            request.body.to_vec(),
            &request_id,
        )
        .await
    {
        Ok(forwarded) => Dispatch::Done(relay(forwarded)),
        Err(e) => Dispatch::Done(forwarding_failure(e)),
    }
}

fn hop_count(headers: &HeaderMap) -> u32 {
    headers
        .get(HEADER_HOPS)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

fn relay(forwarded: ForwardedResponse) -> Response {
    let mut builder = Response::builder()
        .status(forwarded.status)
        .header(HEADER_REDIRECTED_TO, forwarded.shard.to_string());
    if let Some(content_type) = forwarded.content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    if let Some(served_by) = forwarded.served_by {
        builder = builder.header(HEADER_SERVED_BY, served_by);
    }

    match builder.body(Body::from(forwarded.body)) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Failed to relay response from shard {}: {}", forwarded.shard, e);
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

fn served<T: Serialize>(router: &ShardRouter, body: T) -> Response {
    with_served_by(router, StatusCode::OK, Json(body))
}

fn with_served_by(router: &ShardRouter, status: StatusCode, body: impl IntoResponse) -> Response {
    (
        status,
        [(HEADER_SERVED_BY, router.current_index().to_string())],
        body,
    )
        .into_response()
}

fn storage_failure(router: &ShardRouter, error: StorageError) -> Response {
    tracing::error!("Storage failure on shard {}: {}", router.current_index(), error);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

fn kv_failure(router: &ShardRouter, error: KvError) -> Response {
    match error {
        KvError::Storage(e) => storage_failure(router, e),
        KvError::Forwarding(e) => forwarding_failure(e),
        KvError::NonUtf8Value(_) => error_response(StatusCode::BAD_REQUEST, error.to_string()),
    }
}

fn forwarding_failure(error: ForwardingError) -> Response {
    let status = match &error {
        ForwardingError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ForwardingError::UnknownShard(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    };
    error_response(status, format!("Error redirecting the request: {}", error))
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(error))).into_response()
}
