pub mod accounting;
pub mod export;
pub mod init;
pub mod show;
pub mod watch;
