//! Server-side notification services: storage, token registry and push dispatch.

pub mod dispatch;
pub mod notification;
pub mod token;
