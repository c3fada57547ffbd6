//! Async plumbing shared by the mention engine: a debounced background
//! hook framework and cooperative task cancellation.

mod cancel;
mod debounce;

pub use cancel::{
  TaskController,
  TaskHandle,
  cancelable_future,
};
pub use debounce::{
  AsyncHook,
  send_blocking,
};
