pub mod matchups;
pub mod teams;
pub mod user_statistics;

pub use matchups::{CreateMatchup, SourceKind};
pub use teams::{CompositeStats, CreateTeam, TeamWithMembers};
pub use user_statistics::UpsertUserStatistics;
