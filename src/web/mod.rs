//! Minimal web layer: requests, responses, named routes and an `App`
//! that dispatches to them. The HTTP server itself lives in `cli::serve`.

mod app;
mod http;
mod router;

pub use app::{AfterHook, App};
pub use http::{Headers, Method, Request, Response};
pub use router::{Handler, Route, RouteError, RouteTable};
