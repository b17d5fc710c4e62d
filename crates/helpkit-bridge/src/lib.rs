pub mod handlers;
pub mod protocol;
pub mod server;
pub mod sessions;

pub use server::{run_server, serve};
pub use sessions::{SessionRegistry, DEFAULT_MAX_SESSIONS};
