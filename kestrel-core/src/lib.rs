//! Shared core for the Kestrel engine: opaque pool handles, a small
//! logger, signal/connection event edges, and the engine-wide error kinds.

pub mod error;
pub mod log;
pub mod pool;
pub mod signal;

pub use error::{EngineError, EngineResult};
pub use log::{Log, MessageKind};
pub use pool::{Handle, Pool};
pub use signal::{Connection, Signal};
