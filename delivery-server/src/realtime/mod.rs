//! Realtime layer
//!
//! Persistent client connections with an authenticated session protocol:
//!
//! ```text
//! ┌──────────────┐   register/unregister   ┌────────────────────┐
//! │ ClientSession│ ───────────────────────▶ │ ConnectionRegistry │
//! └──────┬───────┘                          └─────────┬──────────┘
//!        │ frames                                     │ lookup (read-only)
//!        ▼                                            ▼
//!   TCP transport                          NotificationDispatcher
//! ```
//!
//! Wire format: 4-byte little-endian length prefix followed by a JSON
//! object `{"event": <name>, "data": <payload>}`.

pub mod registry;
pub mod server;
pub mod session;

pub use registry::{ConnectionHandle, ConnectionRegistry};
pub use server::RealtimeGateway;
pub use session::ClientSession;

use serde::Serialize;
use serde_json::Value;
use shared::AppError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Upper bound on a single frame; protects the unauthenticated path from
/// hostile length prefixes.
const MAX_FRAME_LEN: usize = 256 * 1024;

/// Read one length-prefixed JSON frame.
pub async fn read_frame<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Value, AppError> {
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| AppError::internal(format!("Read len failed: {e}")))?;

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(AppError::validation(format!("Frame too large: {len} bytes")));
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| AppError::internal(format!("Read payload failed: {e}")))?;

    serde_json::from_slice(&payload)
        .map_err(|e| AppError::validation(format!("Invalid frame payload: {e}")))
}

/// Write one length-prefixed JSON frame. Serves both directions: the
/// session writes `ServerEvent`s, clients (and tests) write raw values.
pub async fn write_frame<W: AsyncWriteExt + Unpin, T: Serialize>(
    writer: &mut W,
    frame: &T,
) -> Result<(), AppError> {
    let payload = serde_json::to_vec(frame)
        .map_err(|e| AppError::internal(format!("Failed to serialize frame: {e}")))?;

    let mut data = Vec::with_capacity(4 + payload.len());
    data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    data.extend_from_slice(&payload);

    writer
        .write_all(&data)
        .await
        .map_err(|e| AppError::internal(format!("Write failed: {e}")))?;
    Ok(())
}
