// src/exec/mod.rs

//! Task body execution layer.
//!
//! - [`body`] defines the [`TaskBody`] trait user code implements.
//! - [`callback`] owns the completion channel and the [`Callback`] handle
//!   through which a body reports its outcome.
//! - [`backend`] provides the `DispatchBackend` trait and the
//!   `BlockingPoolBackend` the runtime uses in production, which tests can
//!   wrap.

pub mod backend;
pub mod body;
pub mod callback;

pub use backend::{spawn_body, BlockingPoolBackend, DispatchBackend};
pub use body::{body_fn, TaskBody};
pub use callback::{completion_channel, Callback, CompletionReceiver, CompletionSender};
