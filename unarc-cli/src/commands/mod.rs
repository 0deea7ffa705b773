//! Command implementations for the unarc CLI.

pub mod detect;
pub mod extract;
pub mod list;

pub use detect::cmd_detect;
pub use extract::{ExtractArgs, cmd_extract};
pub use list::{ListOptions, cmd_list};
