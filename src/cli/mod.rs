//! # CLI Module
//!
//! User-facing commands of the playlist reverser.
//!
//! - [`auth`] - obtains a credential through the auth flow, reusing the cached
//!   one when it is still accepted, and cancels on Ctrl-C
//! - [`reverse`] - writes a source playlist's tracks into a target playlist in
//!   reverse order
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotrev auth --client-id <ID> --client-secret <SECRET>
//! spotrev reverse --client-id <ID> --client-secret <SECRET> \
//!     --source-playlist-id 37i9dQZF1DXcBWIGoYBM5M
//! spotrev reverse ... --target-playlist-name "Top Hits, backwards" --override-existing
//! ```

mod auth;
mod reverse;

pub use auth::auth;
pub use reverse::reverse;
