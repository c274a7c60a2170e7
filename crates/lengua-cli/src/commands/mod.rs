pub mod classify;
pub mod init;
pub mod play;
pub mod score;
pub mod validate;
