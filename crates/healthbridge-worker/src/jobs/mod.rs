//! Job handler implementations.

pub mod cleanup;
pub mod expiry;
pub mod notification;

pub use cleanup::ExpiredCleanupHandler;
pub use expiry::ExpiryAlertHandler;
pub use notification::NotificationTrimHandler;
