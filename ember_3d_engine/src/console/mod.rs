//! Console command module
//!
//! The command registry shared by the host (built-in `Scene.*`
//! commands) and loaded modules (registered through the link table).

mod command_registry;
mod scene_bindings;

pub use command_registry::{
    CommandRegistry, CommandHandler, CommandDesc, CommandValue, ForeignCommand,
    ForeignCommandFn, NativeCommandFn, parse_command_line,
};
pub use scene_bindings::SCENE_NAMESPACE;
pub(crate) use scene_bindings::register_scene_commands;
