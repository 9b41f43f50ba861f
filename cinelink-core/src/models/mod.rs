pub mod id;
pub mod report;
pub mod source;
pub mod user;

pub use id::{ReportId, SourceId, UserId};
pub use report::{Report, ReportStatus, ReportWithSource};
pub use source::{
    LicenseType, MediaType, NewWatchSource, OriginKind, PlaybackType, Source, SourceStatus,
    WatchSource,
};
pub use user::{User, UserRole};
