//! Notification fan-out
//!
//! Delivers order events to interested parties: live realtime connections
//! first, then the durable push channel. The two channels are independent
//! and a failure in either never fails the mutation that triggered it.

pub mod dispatcher;
pub mod push;

pub use dispatcher::NotificationDispatcher;
pub use push::{HttpPushGateway, LogPushGateway, PushGateway, PushMessage, PushService};
