//! CLI command handlers, one file per command.

mod download;
mod list;
mod update;

pub use download::run_download;
pub use list::run_list;
pub use update::run_update;
