//! Background delivery runtime.
//!
//! Receives pushes while the application is in the background, shows them,
//! saves them to the server (or to a local queue when the server cannot be
//! reached) and keeps open windows in sync. The host platform is reached only
//! through the traits in [`platform`].

pub mod click;
pub mod config;
pub mod drain;
pub mod error;
pub mod handler;
pub mod payload;
pub mod pipeline;
pub mod platform;
pub mod queue;
pub mod remote;
pub mod worker;

pub use config::WorkerConfig;
pub use error::WorkerError;
pub use payload::{DisplayedNotification, PushPayload};
pub use worker::ServiceWorker;
