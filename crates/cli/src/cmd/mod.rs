mod build;
mod clean;
mod rebuild;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use rebuild::cmd_rebuild;
