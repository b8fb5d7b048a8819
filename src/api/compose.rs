//! Route group registration
//!
//! Route groups are collected first and turned into one axum [`Router`]
//! only after every method+path pair has been checked. A duplicate aborts
//! composition instead of letting one handler shadow another.

use std::collections::HashMap;

use axum::{
    handler::Handler,
    http::Method,
    middleware,
    routing::{self, MethodRouter},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::api::translator::{translate_failures, Translator};
use crate::error::{Error, Result};

struct Route<S> {
    method: Method,
    path: String,
    handler: MethodRouter<S>,
}

/// Named set of handlers sharing a URL prefix
pub struct RouteGroup<S> {
    name: String,
    prefix: String,
    routes: Vec<Route<S>>,
}

impl<S> RouteGroup<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// `prefix` is either empty or starts with `/`
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            routes: Vec::new(),
        }
    }

    pub fn get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.push(Method::GET, path, routing::get(handler))
    }

    pub fn post<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.push(Method::POST, path, routing::post(handler))
    }

    pub fn put<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.push(Method::PUT, path, routing::put(handler))
    }

    pub fn delete<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.push(Method::DELETE, path, routing::delete(handler))
    }

    fn push(mut self, method: Method, path: &str, handler: MethodRouter<S>) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            handler,
        });
        self
    }
}

/// Builds the application instance from route groups
pub struct ServiceComposer<S> {
    groups: Vec<RouteGroup<S>>,
}

impl<S> Default for ServiceComposer<S> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<S> ServiceComposer<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, group: RouteGroup<S>) -> Self {
        self.groups.push(group);
        self
    }

    /// Register every group and install the failure translator.
    ///
    /// Fails on the first method+path pair claimed twice, or on two paths
    /// that differ only in parameter names.
    pub fn build(self, state: S, translator: Translator) -> Result<Router> {
        let mut owners: HashMap<(Method, String), String> = HashMap::new();
        let mut shapes: HashMap<String, String> = HashMap::new();
        let mut router: Router<S> = Router::new();

        for group in self.groups {
            for route in group.routes {
                let path = join_path(&group.prefix, &route.path)?;
                let shape = path_shape(&path);

                if let Some(existing) = shapes.get(&shape) {
                    if existing != &path {
                        return Err(Error::invalid_route(format!(
                            "{} conflicts with {} in group '{}'",
                            path, existing, group.name
                        )));
                    }
                }
                shapes.insert(shape.clone(), path.clone());

                let key = (route.method.clone(), shape);
                if let Some(first) = owners.get(&key) {
                    return Err(Error::RouteConflict {
                        method: route.method.to_string(),
                        path,
                        first: first.clone(),
                        second: group.name.clone(),
                    });
                }
                owners.insert(key, group.name.clone());

                tracing::debug!(group = %group.name, method = %route.method, %path, "Registered route");
                router = router.route(&path, route.handler);
            }
        }

        Ok(router
            .with_state(state)
            .layer(middleware::from_fn_with_state(translator, translate_failures))
            .layer(CatchPanicLayer::new())
            .layer(TraceLayer::new_for_http()))
    }
}

fn join_path(prefix: &str, path: &str) -> Result<String> {
    if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
        return Err(Error::invalid_route(format!(
            "prefix '{}' must start with '/' and not end with '/'",
            prefix
        )));
    }
    if !path.is_empty() && !path.starts_with('/') {
        return Err(Error::invalid_route(format!(
            "path '{}' must start with '/'",
            path
        )));
    }

    let joined = match (prefix, path) {
        ("", "") => "/".to_string(),
        (prefix, "") | (prefix, "/") if !prefix.is_empty() => prefix.to_string(),
        (prefix, path) => format!("{}{}", prefix, path),
    };
    Ok(joined)
}

/// Path with parameter names erased: `/a/{id}` and `/a/{key}` share a shape
fn path_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with("{*") && segment.ends_with('}') {
                "{*}"
            } else if segment.starts_with('{') && segment.ends_with('}') {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
