//! Domain models shared by the server and its clients.

pub mod order;
pub mod party;

pub use order::{
    MenuItem, Order, OrderDraft, OrderDraftItem, OrderItemView, OrderStatus, OrderView,
    PaymentStatus,
};
pub use party::{Restaurant, Rider, Role};
