//! HTTP API for txt2svg.
//!
//! A single render endpoint plus static file delegation:
//!
//! - `GET /service?text=&font=&color=` - render text to SVG
//! - `GET /<path>` - static asset from the asset store (`/` → `index.html`)
//!
//! Every other method gets a 405.

mod error;
pub mod handlers;
pub mod response;
mod router;
mod server;
mod state;

pub use error::{ApiError, INTERNAL_ERROR_MESSAGE};
pub use router::{SERVICE_PATH, route};
pub use server::{ApiServer, ServerConfig};
pub use state::{AppState, DEFAULT_INDEX_FILE};
