//! Delivery Server — food-delivery marketplace backend
//!
//! # Architecture overview
//!
//! - **Order engine** (`orders`): lifecycle state machine with role-based
//!   authorization and conditional-update concurrency guards
//! - **Realtime** (`realtime`): authenticated persistent connections and
//!   the connection registry
//! - **Notifications** (`notify`): realtime fan-out with durable push
//!   fallback
//! - **Database** (`db`): embedded SQLite storage
//! - **Auth** (`auth`): JWT credential verification
//! - **HTTP API** (`api`): RESTful surface
//!
//! # Module structure
//!
//! ```text
//! delivery-server/src/
//! ├── core/          # config, state, server bootstrap
//! ├── auth/          # JWT verification, extractor
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # pool + repositories
//! ├── orders/        # order lifecycle engine
//! ├── realtime/      # session protocol, registry, gateway
//! ├── notify/        # dispatcher + push collaborator
//! └── utils/         # logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod notify;
pub mod orders;
pub mod realtime;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrderService;
pub use realtime::{ConnectionRegistry, RealtimeGateway};
pub use shared::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Set up the process environment: dotenv plus logging.
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____       ___
   / __ \___  / (_)   _____  _______  __
  / / / / _ \/ / / | / / _ \/ ___/ / / /
 / /_/ /  __/ / /| |/ /  __/ /  / /_/ /
/_____/\___/_/_/ |___/\___/_/   \__, /
                               /____/
    "#
    );
}
