pub mod potentials;
pub mod progression;
pub mod teams;
