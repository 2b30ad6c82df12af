pub mod session;
pub mod share;
pub mod task_ops;
pub mod view;
