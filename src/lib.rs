pub mod cli;
pub mod model;
pub mod ops;
pub mod store;
