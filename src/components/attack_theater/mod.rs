mod component;
mod socket;
pub mod stream;
pub mod types;

pub use component::AttackTheater;
pub use types::{AttackStep, StepStats};
