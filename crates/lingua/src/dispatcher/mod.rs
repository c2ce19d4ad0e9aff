//! Session routing between transports and the curriculum engine

pub mod locks;
pub mod report;
pub mod service;

pub use locks::{UserGuard, UserLocks};
pub use report::ProgressReport;
pub use service::AdaptiveDispatcher;
