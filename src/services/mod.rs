//! Domain services: lifecycle rules, sessions, storage, export and events.

pub mod event_broadcaster;
pub mod export;
pub mod lifecycle;
pub mod report_id;
pub mod session;
pub mod storage;

pub use event_broadcaster::EventBroadcaster;
pub use storage::Storage;
