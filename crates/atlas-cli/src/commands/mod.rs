//! CLI commands

pub mod add;
pub mod fetch;
pub mod init;
pub mod list;
pub mod render;
pub mod repos;
