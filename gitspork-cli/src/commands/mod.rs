pub mod init;
pub mod integrate;
pub mod schema;
