pub mod modes;
pub mod seeding;
pub mod service;
pub mod stats;

pub use modes::{ModeDivision, ModeTable};
pub use seeding::{compute_seed, rank_teams, MatchupScore, SeedEntry};
pub use service::{
    recompute_composite, refresh_team_stats, remove_member, seed_teams, CompositeOutcome,
    TeamServiceError,
};
pub use stats::{MemberStatistics, PgStatisticsProvider, StatisticsProvider, StatsError};
