//! Process-wide state shared between the server and the shutdown handler.

mod state;

pub use state::{is_shutdown, register_server, setup_shutdown_handler};
