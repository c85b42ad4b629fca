//! # dyel-http
//!
//! JSON-over-HTTP adapter for the Program repository.
//!
//! [`router::handle`] maps one request onto a [`dyel_db::ProgramRepository`]
//! call and is transport-free, so it is tested directly. [`server::ApiServer`]
//! feeds it from a `tiny_http` listener.

pub mod error;
pub mod router;
pub mod server;

pub use error::HttpError;
pub use router::{ApiResponse, handle};
pub use server::ApiServer;
