//! # v4v Core
//!
//! Shared building blocks for the v4v Binance spot tools.
//!
//! 1. **Exact decimals** - `Fixed` wraps `rust_decimal`, never floats
//! 2. **Wall-clock timing** - millisecond timestamps for signed requests
//! 3. **Client order ids** - nanoid based, inside the exchange's alphabet
//! 4. **Unified logging** - `tracing` with an `EnvFilter` subscriber

pub mod fixed;
pub mod id_gen;
pub mod logging;
pub mod timing;

pub use fixed::{Fixed, FixedError};
pub use id_gen::{ClientOrderId, IdError, generate_id};
pub use logging::init_logging;
pub use timing::{PerfTimer, Timestamp, nanos, timestamp_ms};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixed::{Fixed, FixedError};
    pub use crate::id_gen::{ClientOrderId, generate_id, generate_id_with_prefix};
    pub use crate::logging::init_logging;
    pub use crate::timing::{PerfTimer, Timestamp, nanos, timestamp_ms};

    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
}
