#![doc = include_str!("../README.md")]

pub mod gauss;
pub mod instantiate;
pub mod pipeline;
pub mod result;

pub use gauss::{solve, Answer, GaussSolver};
pub use instantiate::{instantiate, instantiate_with_options, InstantiationError, Strategy};
