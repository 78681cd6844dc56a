//! different utility modules used throughout the project
/// terminal logger setup for selection and grid runs
pub mod logger;
