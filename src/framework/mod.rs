pub mod templates;
pub mod types;

pub use types::{Framework, FrameworkSpec};
