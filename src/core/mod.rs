pub mod catalog;
pub mod progression;
pub mod queue;
pub mod rng;
pub mod snapshot;
