pub mod graph;
pub mod home;
pub mod not_found;
pub mod simulation;
