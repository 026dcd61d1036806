//! Named exact-path routes.

use std::fmt;

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::{Method, Request, Response};

pub type Handler = Box<dyn Fn(&Request) -> anyhow::Result<Response> + Send + Sync>;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route `{0}` is already bound")]
    DuplicateName(String),

    #[error("route pattern `{0}` must start with `/`")]
    InvalidPattern(String),
}

pub struct Route {
    pub name: String,
    pub pattern: String,
    handler: Handler,
}

impl Route {
    pub fn handle(&self, request: &Request) -> anyhow::Result<Response> {
        (self.handler)(request)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Routes in binding order, matched on GET and HEAD by exact path.
///
/// When two routes share a pattern the first bound one wins.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_name: FxHashMap<String, usize>,
    by_pattern: FxHashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(
        &mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        handler: Handler,
    ) -> Result<(), RouteError> {
        let name = name.into();
        let pattern = pattern.into();
        if self.by_name.contains_key(&name) {
            return Err(RouteError::DuplicateName(name));
        }
        if !pattern.starts_with('/') {
            return Err(RouteError::InvalidPattern(pattern));
        }

        let idx = self.routes.len();
        self.by_name.insert(name.clone(), idx);
        self.by_pattern.entry(pattern.clone()).or_insert(idx);
        self.routes.push(Route {
            name,
            pattern,
            handler,
        });
        Ok(())
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<&Route> {
        if !method.is_safe() {
            return None;
        }
        self.by_pattern.get(path).map(|&idx| &self.routes[idx])
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&idx| &self.routes[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(body: &'static str) -> Handler {
        Box::new(move |_| Ok(Response::new(200, body)))
    }

    #[test]
    fn test_bind_and_find() {
        let mut routes = RouteTable::new();
        routes.bind("_assetic_app", "/css/app.css", text("app")).unwrap();
        routes.bind("_assetic_app_0", "/css/app_part_1_a.css", text("a")).unwrap();

        let route = routes.find(&Method::Get, "/css/app.css").unwrap();
        assert_eq!(route.name, "_assetic_app");
        assert_eq!(route.handle(&Request::get("/css/app.css")).unwrap().body, b"app");

        assert!(routes.find(&Method::Head, "/css/app_part_1_a.css").is_some());
        assert!(routes.find(&Method::Other("POST".into()), "/css/app.css").is_none());
        assert!(routes.find(&Method::Get, "/css/app.css/").is_none());
        assert_eq!(routes.get("_assetic_app_0").unwrap().pattern, "/css/app_part_1_a.css");
        assert_eq!(routes.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut routes = RouteTable::new();
        routes.bind("a", "/a", text("1")).unwrap();
        assert!(matches!(
            routes.bind("a", "/b", text("2")),
            Err(RouteError::DuplicateName(_))
        ));
        assert!(matches!(
            routes.bind("b", "relative", text("2")),
            Err(RouteError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_first_route_wins_on_shared_pattern() {
        let mut routes = RouteTable::new();
        routes.bind("first", "/x", text("1")).unwrap();
        routes.bind("second", "/x", text("2")).unwrap();
        assert_eq!(routes.find(&Method::Get, "/x").unwrap().name, "first");
    }
}
