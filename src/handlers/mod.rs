//! Event handlers: route an envelope, submit new objects, poll pending jobs.

pub mod dispatch;
pub mod poll;
pub mod submission;

pub use dispatch::dispatch;
