//! Request dispatch with post-response hooks.

use super::{Handler, Method, Request, Response, RouteError, RouteTable};
use crate::log;

pub type AfterHook = Box<dyn Fn(&Request, &Response) -> anyhow::Result<()> + Send + Sync>;

/// Routes plus the hooks run after every request.
///
/// Immutable once the server starts, so it can be shared across workers.
#[derive(Default)]
pub struct App {
    routes: RouteTable,
    after: Vec<AfterHook>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        handler: Handler,
    ) -> Result<(), RouteError> {
        self.routes.bind(name, pattern, handler)
    }

    pub fn after(&mut self, hook: AfterHook) {
        self.after.push(hook);
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Dispatch `request` and run the after hooks.
    ///
    /// Never fails: a missing route is a 404, a handler error a 500, and a
    /// hook error is logged without touching the response.
    pub fn handle(&self, request: &Request) -> Response {
        let mut response = match self.routes.find(&request.method, &request.path) {
            None => Response::not_found(),
            Some(route) => route.handle(request).unwrap_or_else(|err| {
                log!("error"; "{} {}: {:#}", route.name, request.path, err);
                Response::server_error()
            }),
        };

        for hook in &self.after {
            if let Err(err) = hook(request, &response) {
                log!("error"; "after {}: {:#}", request.path, err);
            }
        }

        if request.method == Method::Head {
            response.body.clear();
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn app_with_counter() -> (App, Arc<AtomicUsize>) {
        let mut app = App::new();
        app.get("ok", "/ok", Box::new(|_| Ok(Response::new(200, "fine"))))
            .unwrap();
        app.get("fail", "/fail", Box::new(|_| anyhow::bail!("broken asset")))
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        app.after(Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        (app, calls)
    }

    #[test]
    fn test_dispatch() {
        let (app, calls) = app_with_counter();

        let response = app.handle(&Request::get("/ok"));
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"fine");

        assert_eq!(app.handle(&Request::get("/missing")).status, 404);
        assert_eq!(app.handle(&Request::get("/fail")).status, 500);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_head_strips_body() {
        let (app, _) = app_with_counter();
        let response = app.handle(&Request::new(Method::Head, "/ok"));
        assert_eq!(response.status, 200);
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_hook_error_keeps_response() {
        let (mut app, _) = app_with_counter();
        app.after(Box::new(|_, _| anyhow::bail!("disk full")));
        assert_eq!(app.handle(&Request::get("/ok")).status, 200);
    }
}
