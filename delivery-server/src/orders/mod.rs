//! Order Lifecycle Engine
//!
//! Validates transitions, enforces role-based authorization through the
//! owner link, persists via conditional updates and fans each change out
//! to customer, restaurant and rider.

pub mod access;
pub mod service;

pub use access::{OrderOp, OrderRefs};
pub use service::{CreateOrderInput, CreateOrderItem, OrderService};
