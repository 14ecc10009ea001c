//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace:
//! the records flowing through the inbound queue, the write sink the
//! dispatcher flushes into, the task log it writes to, and the blueprint
//! it is configured from.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.

mod blueprint;
mod cancel;
mod destination_id;
mod error;
mod record;
mod sink;
mod task;

pub use blueprint::*;
pub use cancel::{CancellationSource, NeverCancelled};
pub use destination_id::DestinationId;
pub use error::*;
pub use record::*;
pub use sink::*;
pub use task::*;
