//! The shared key-value store clients synchronise through.
//!
//! Clients only ever see the [`SharedStore`] capability; [`InMemoryStore`] backs
//! local play and the test suites.

pub mod config;
pub mod error;
pub mod memory;
pub mod path;
pub mod retry;
pub mod subscription;
pub mod traits;

pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::InMemoryStore;
pub use path::StorePath;
pub use retry::retry_with_backoff;
pub use subscription::Subscription;
pub use traits::SharedStore;
