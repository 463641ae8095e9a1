//! Herald API server: notification storage, listing and push dispatch.
//!
//! Endpoints:
//! - POST /api/notifications/save: Store a delivered push (background runtime)
//! - GET  /api/notifications/fetch: Page through unread notifications
//! - POST /api/notifications/{id}/read: Mark a notification as read
//! - POST /api/notifications/webhook: Send a push to a user via FCM
//! - POST /api/fcm-token: Register the caller's FCM token

pub mod middleware;
pub mod routes;
pub mod state;
