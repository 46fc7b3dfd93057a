// Server module entry
// Listener setup, accept loop, per-connection serving and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// Rust does not allow `loop` as a module name
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;

use crate::captcha::RecaptchaVerifier;
use crate::config::AppState;
use crate::store::DataApiStore;

/// Application state wired to the production Data API and reCAPTCHA clients
pub type LiveState = AppState<DataApiStore, RecaptchaVerifier>;
