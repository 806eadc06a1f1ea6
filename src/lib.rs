pub mod args;
pub mod database;
pub mod env;
pub mod error;
pub mod model;
pub mod utils;
