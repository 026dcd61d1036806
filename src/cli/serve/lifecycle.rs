//! Server binding and shutdown registration.

use crate::{core::register_server, log};
use anyhow::{Result, bail};
use std::{net::SocketAddr, sync::Arc};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the interface, trying the next port while the current one is taken.
pub fn bind_with_retry(interface: std::net::IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_err = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_err = Some(e),
        }
    }

    let last_port = base_port.saturating_add(MAX_PORT_RETRIES - 1);
    match last_err {
        Some(e) => bail!(
            "failed to bind after {} attempts (ports {}-{}): {}",
            MAX_PORT_RETRIES,
            base_port,
            last_port,
            e
        ),
        None => bail!("failed to bind {}:{}", interface, base_port),
    }
}

/// Hand the server to the Ctrl+C handler so it can unblock the request loop.
pub fn register_for_shutdown(server: Arc<Server>) {
    register_server(server);
}
