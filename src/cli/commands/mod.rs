mod command_result;
pub mod formats;
pub mod init;
pub mod sync;

pub use command_result::*;
