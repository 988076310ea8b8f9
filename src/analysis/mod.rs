//! Aggregate statistics over the whole family store.

pub mod generations;

pub use generations::{TreeStats, count_generations, count_marriages};
