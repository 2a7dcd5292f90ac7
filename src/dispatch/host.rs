//! @acp:module "Host Router"
//! @acp:summary "Mounting dispatched routes onto an HTTP framework"
//! @acp:domain cli
//! @acp:layer integration
//!
//! Host router seam
//!
//! The dispatcher never talks to an HTTP framework directly. It hands one
//! [`RouteHandler`] per operation to a [`HostRouter`]; `axum::Router` is the
//! provided host.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::trace;

use super::{DispatchRequest, DispatchResponse};
use crate::conventions::Verb;

/// Framework-neutral handler for one route
pub type RouteHandler = Arc<dyn Fn(DispatchRequest) -> BoxFuture<'static, DispatchResponse> + Send + Sync>;

/// Something routes can be registered on
pub trait HostRouter: Sized {
    fn register_route(self, verb: Verb, path: &str, handler: RouteHandler) -> Self;
}

impl<S> HostRouter for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn register_route(self, verb: Verb, path: &str, handler: RouteHandler) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let endpoint = move |Query(query): Query<HashMap<String, String>>, body: Bytes| {
            let handler = Arc::clone(&handler);
            async move {
                // A missing or non-JSON body reads as null
                let body = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
                trace!(params = query.len(), "Dispatching request");
                let response = handler(DispatchRequest { query, body }).await;
                let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(response.envelope)).into_response()
            }
        };

        let method_router = match verb {
            Verb::Get => get(endpoint),
            Verb::Post => post(endpoint),
            Verb::Put => put(endpoint),
            Verb::Delete => delete(endpoint),
        };
        self.route(&path, method_router)
    }
}
