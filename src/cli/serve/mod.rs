//! HTTP server exposing the asset routes.

mod lifecycle;
mod path;
mod response;

use crate::{config::ProviderConfig, core, debug, log, logger, provider::Provider};
use anyhow::{Context, Result};
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bind the configured address and answer requests until Ctrl+C.
pub fn serve(config: &ProviderConfig, provider: Provider) -> Result<()> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_for_shutdown(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    debug!("serve"; "{} routes, {} workers", provider.routes.len(), config.serve.workers);

    run_request_loop(&server, Arc::new(provider), config.serve.workers)
}

fn run_request_loop(server: &Server, provider: Arc<Provider>, workers: usize) -> Result<()> {
    // Materializing an asset runs filters, keep it off the accept loop
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let provider = Arc::clone(&provider);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &provider) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, provider: &Provider) -> Result<()> {
    if core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let Some(web_request) = response::to_web_request(&request) else {
        logger::access(request.method().as_str(), request.url(), 400);
        return response::respond_bad_request(request);
    };

    let web_response = provider.app.handle(&web_request);
    logger::access(
        &web_request.method.to_string(),
        &web_request.path,
        web_response.status,
    );
    response::send(request, web_response)
}
