//! Shared types for the delivery platform
//!
//! Common types used by the server and its realtime clients: domain models,
//! wire-protocol events, error types and response structures.

pub mod error;
pub mod models;
pub mod realtime;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult};
pub use models::{Order, OrderStatus, PaymentStatus, Role};
pub use realtime::{ClientEvent, ServerEvent};
