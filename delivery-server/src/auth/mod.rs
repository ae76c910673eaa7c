//! Authentication
//!
//! JWT verification against a shared secret, plus the axum extractor that
//! turns a bearer token into a [`CurrentUser`].

pub mod extractor;
pub mod jwt;

pub use extractor::CurrentUser;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
