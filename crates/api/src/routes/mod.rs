pub mod matchups;
pub mod teams;
pub mod tournaments;
