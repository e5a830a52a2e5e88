//! CLI commands

mod affected;
mod build;
mod completions;
mod init;
mod test;

pub use affected::AffectedCommand;
pub use build::BuildCommand;
pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use test::TestCommand;
