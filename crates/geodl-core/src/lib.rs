pub mod catalog;
pub mod checksum;
pub mod download;
pub mod logging;
pub mod resolver;
pub mod transfer;
