pub mod report;
pub mod user;
pub mod watch_source;

pub use report::{ReportRepository, ReportStore};
pub use user::{UserRepository, UserStore};
pub use watch_source::{WatchSourceRepository, WatchSourceStore};

#[cfg(test)]
pub use report::MockReportStore;
#[cfg(test)]
pub use user::MockUserStore;
#[cfg(test)]
pub use watch_source::MockWatchSourceStore;
