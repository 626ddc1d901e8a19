pub mod handle_command;

pub use self::handle_command::*;
