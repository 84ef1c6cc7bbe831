//! Simulated collaborators
//!
//! - [`SimBoard`] - In-memory board with fault injection
//! - [`SimReactor`] - Readiness reactor fed by [`SimReactor::fire`]

mod board;
mod reactor;

pub use board::{SimBoard, SimEdgeSource, SimEvent, SimOp, EVENT_LOG_LEN};
pub use reactor::{SimReactor, READY_QUEUE_LEN};
