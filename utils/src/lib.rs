//! Shared infrastructure utilities for StudioFlow.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename), used for the
//!   durable session file.

pub mod atomic_write;

pub use atomic_write::{
    AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy, atomic_write_with_options,
    remove_if_exists,
};
