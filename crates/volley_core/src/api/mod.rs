// Front-end boundary: sessions, effects and the JSON command API

pub mod command;
pub mod effect;
pub mod session;

pub use command::{handle_command, handle_command_json, Command, CommandRequest, CommandResponse};
pub use effect::{Effect, Reply};
pub use session::MatchSession;
