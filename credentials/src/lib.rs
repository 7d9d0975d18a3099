//! Signed credential primitives.
//!
//! Three independent components share one contract: mint a compact artifact
//! that proves integrity under a shared secret (or a provider's public key),
//! bound its validity in time and reject any tampering.
//!
//! - [`claims_token`] issues and verifies HS256 session tokens.
//! - [`signed_link`] signs URLs with an embedded issuance timestamp.
//! - [`identity`] drives the provider redirect flow and validates provider
//!   issued identity tokens against the remote key set.

pub use self::error::{Error, Result};
pub use self::secret::Secret;
pub use self::utils::time::{Clock, ManualClock, SystemClock};

pub mod claims_token;
pub mod identity;
pub mod signed_link;

mod error;
mod secret;
mod utils;
