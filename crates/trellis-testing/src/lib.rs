//! Testing utilities and harness for Trellis.
//!
//! Everything a holder test needs without a layout engine or a real main
//! thread: a drainable [`ManualExecutor`] standing in for the main-thread
//! queue, a [`TestComponent`] with a declared intrinsic size, a
//! [`TestLayoutTree`] that measures by resolving constraints against that
//! intrinsic size, and the [`state_updates`] helper demonstrating the
//! apply-mutation / drain-queue / re-measure protocol.

mod manual_executor;
mod test_component;
mod test_tree;

pub mod state_updates;

pub use manual_executor::*;
pub use test_component::*;
pub use test_tree::*;
