//! Duplicate-message suppression for inbound chat traffic.
//!
//! A [`DuplicateFilter`] keeps a short, time-windowed history per sender and
//! rejects messages that repeat (exactly, or by word overlap) something
//! recently seen. It runs synchronously ahead of any expensive handling.

pub mod clock;
pub mod filter;
mod history;
mod index;
pub mod shared;
pub mod text;

pub use clock::{Clock, ManualClock, SystemClock};
pub use filter::DuplicateFilter;
pub use shared::SharedFilter;
pub use text::{fingerprint, normalize, similarity};
