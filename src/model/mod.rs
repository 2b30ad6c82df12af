pub mod settings;
pub mod task;
pub mod user;

pub use settings::*;
pub use task::*;
pub use user::*;
