//! # HTTP API
//!
//! HTTP boundary of the content mixer.
//!
//! - `GET /?count=N&offset=K` returns a JSON array of content items
//! - anything else is `404 Not found`
//! - bad parameters are `400`, service failures are a bare `500`

mod error;
mod handler;
mod params;
mod server;

pub use error::ApiError;
pub use handler::{router, AppState};
pub use params::{parse_content_params, ContentParams};
pub use server::{serve, ContentServer, RunningContentServer};
