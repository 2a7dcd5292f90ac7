//! @acp:module "Runtime Dispatcher"
//! @acp:summary "Route table construction and request handling for live API objects"
//! @acp:domain cli
//! @acp:layer service
//!
//! # Runtime Dispatcher
//!
//! Binds a live [`ApiObject`] to routes:
//! 1. **Check** the object's declaration is a registered API
//! 2. **Enumerate** its methods, keeping exposed operations only
//! 3. **Derive** verb and path per operation (shared conventions)
//! 4. **Serve** requests by coercing arguments and invoking the method
//!
//! Configuration problems (`NotAnApi`, `ArityMismatch`) surface from
//! [`Dispatcher::build`] before any route exists. Failures while serving a
//! request, panics included, become a 500 error envelope for that request.

pub mod coerce;
pub mod host;
pub mod signature;

pub use coerce::{coerce_arguments, Args, BODY_PARAM};
pub use host::{HostRouter, RouteHandler};
pub use signature::MethodSignature;

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::conventions::{endpoint_path, verb_of, Envelope, Verb};
use crate::error::{RestgenError, Result};
use crate::registry::{DeclarationId, ParamType, Registry};

/// A live object whose exposed methods can be served remotely
///
/// Implementations list their methods in declaration order and route
/// `invoke` calls to them by name. The object is shared behind an `Arc`, so
/// mutable state needs interior mutability.
pub trait ApiObject: Send + Sync + 'static {
    /// Declaration this object is an instance of
    fn declaration(&self) -> DeclarationId;

    /// Every method of the object, exposed or not
    fn methods(&self) -> Vec<MethodSignature>;

    /// Call a method with coerced positional arguments
    fn invoke<'a>(&'a self, method: &'a str, args: Args) -> BoxFuture<'a, anyhow::Result<Value>>;
}

/// One bound operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub verb: Verb,
    pub path: String,
    pub method: String,
    pub params: Vec<String>,
    pub types: Vec<ParamType>,
}

/// Framework-neutral request as seen by a handler
#[derive(Debug, Clone, Default)]
pub struct DispatchRequest {
    pub query: HashMap<String, String>,
    /// Parsed JSON body, `Null` when absent or not JSON
    pub body: Value,
}

impl DispatchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}

/// Status and envelope of one handled request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResponse {
    pub status: u16,
    pub envelope: Envelope,
}

impl DispatchResponse {
    pub fn ok(value: Value) -> Self {
        Self {
            status: 200,
            envelope: Envelope::success(value),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            envelope: Envelope::failure(message),
        }
    }
}

/// Builds bound APIs from a registry
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher;

impl Dispatcher {
    /// Bind `object` to the routes of its exposed operations
    ///
    /// Methods with no recorded parameter types take every parameter as
    /// `object`.
    pub fn build<T: ApiObject>(registry: &Registry, object: Arc<T>) -> Result<BoundApi> {
        let id = object.declaration();
        let prefix = registry
            .prefix(&id)
            .ok_or_else(|| RestgenError::NotAnApi(id.to_string()))?;

        let mut routes = Vec::new();
        for signature in object.methods() {
            if !registry.is_exposed(&id, &signature.name) {
                continue;
            }
            let types = match registry.param_types(&id, &signature.name) {
                Some(types) => types.to_vec(),
                None => vec![ParamType::Object; signature.params.len()],
            };
            if types.len() != signature.params.len() {
                return Err(RestgenError::ArityMismatch {
                    declaration: id.to_string(),
                    method: signature.name.clone(),
                    types: types.len(),
                    names: signature.params.len(),
                });
            }

            let route = Route {
                verb: verb_of(&signature.name, &types),
                path: endpoint_path(prefix, &signature.name),
                method: signature.name,
                params: signature.params,
                types,
            };
            debug!(declaration = %id, method = %route.method, verb = %route.verb, path = %route.path, "Bound operation");
            routes.push(route);
        }

        Ok(BoundApi {
            declaration: id,
            object: object as Arc<dyn ApiObject>,
            routes,
        })
    }
}

/// An API object bound to its routes
pub struct BoundApi {
    declaration: DeclarationId,
    object: Arc<dyn ApiObject>,
    routes: Vec<Route>,
}

impl std::fmt::Debug for BoundApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundApi")
            .field("declaration", &self.declaration)
            .field("routes", &self.routes)
            .finish()
    }
}

impl BoundApi {
    pub fn declaration(&self) -> &DeclarationId {
        &self.declaration
    }

    /// Routes in method declaration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the route for a verb and path; a leading `/` is not significant
    pub fn route(&self, verb: Verb, path: &str) -> Option<&Route> {
        let wanted = path.trim_start_matches('/');
        self.routes
            .iter()
            .find(|r| r.verb == verb && r.path.trim_start_matches('/') == wanted)
    }

    /// Serve one request addressed by verb and path
    pub async fn handle(&self, verb: Verb, path: &str, request: DispatchRequest) -> DispatchResponse {
        match self.route(verb, path) {
            Some(route) => self.invoke_route(route, request).await,
            None => DispatchResponse::error(404, format!("No operation at {} {}", verb, path)),
        }
    }

    async fn invoke_route(&self, route: &Route, request: DispatchRequest) -> DispatchResponse {
        let args = coerce_arguments(&route.params, &route.types, &request.query, &request.body);
        let object = Arc::clone(&self.object);
        let call = async move { object.invoke(&route.method, args).await };

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(value)) => DispatchResponse::ok(value),
            Ok(Err(err)) => {
                debug!(method = %route.method, error = %err, "Operation failed");
                DispatchResponse::error(500, err.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(method = %route.method, panic = %message, "Operation panicked");
                DispatchResponse::error(500, message)
            }
        }
    }

    /// Register every route on a host router
    pub fn mount<R: HostRouter>(self: Arc<Self>, mut router: R) -> R {
        for index in 0..self.routes.len() {
            let route = &self.routes[index];
            let (verb, path) = (route.verb, route.path.clone());
            info!(declaration = %self.declaration, %verb, path = %path, "Registering route");

            let api = Arc::clone(&self);
            let handler: RouteHandler = Arc::new(move |request: DispatchRequest| -> BoxFuture<'static, DispatchResponse> {
                let api = Arc::clone(&api);
                Box::pin(async move {
                    let route = &api.routes[index];
                    api.invoke_route(route, request).await
                })
            });
            router = router.register_route(verb, &path, handler);
        }
        router
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "operation panicked".to_string()
    }
}
