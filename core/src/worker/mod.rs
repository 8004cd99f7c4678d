//! Parse worker: one long-lived background context reached only through a
//! request/reply channel.

pub mod client;
pub mod protocol;
pub mod runtime;

pub use client::{ParseDispatcher, ParseReply, WorkerClient};
pub use protocol::{RpcRequest, RpcResponse, WorkerMessage};
pub use runtime::{spawn_worker, WorkerRuntime};
