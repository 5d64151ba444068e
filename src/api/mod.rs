//! # API Module
//!
//! HTTP handlers served by the local callback listener (see
//! [`crate::server::CallbackListener`]). The listener routes every request to
//! [`callback`], which captures the authorization code of the first redirect
//! and answers all later requests with a short "already answered" reply.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::Router;
//! use spotrev::api::callback;
//!
//! let app = Router::new().fallback(callback).with_state(state);
//! ```

mod callback;

pub use callback::{ALREADY_ANSWERED, callback};
