/// Console command registry
///
/// Commands are addressed as `Namespace.name` (e.g. `Scene.addEntity`,
/// `Skybox.load`). Argument counts exclude the command name itself.
/// Handlers are native closures or foreign callbacks registered by
/// loaded modules through the link table.

use std::ffi::{c_char, c_void, CString};
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::plugin::ModuleLease;

/// Value returned by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandValue {
    Void,
    Int(i32),
}

/// Native command handler
pub type NativeCommandFn = dyn Fn(&[&str]) -> Result<CommandValue> + Send + Sync;

/// Foreign command callback.
///
/// `argv` holds `argc` NUL-terminated strings valid for the duration of
/// the call. The return value is surfaced as `CommandValue::Int`.
pub type ForeignCommandFn =
    unsafe extern "C" fn(user_data: *mut c_void, argc: i32, argv: *const *const c_char) -> i32;

/// Callback plus the opaque pointer registered with it
///
/// `lease` ties the callback to the module owning `user_data`. Without
/// one, the registrant keeps `user_data` alive until the command is removed.
#[derive(Clone)]
pub struct ForeignCommand {
    pub callback: ForeignCommandFn,
    pub user_data: *mut c_void,
    pub lease: Option<ModuleLease>,
}

// SAFETY: a module registering a callback guarantees `user_data` may be
// used from whichever thread executes console commands; the registry
// never dereferences it.
unsafe impl Send for ForeignCommand {}
unsafe impl Sync for ForeignCommand {}

#[derive(Clone)]
pub enum CommandHandler {
    Native(Arc<NativeCommandFn>),
    Foreign(ForeignCommand),
}

impl CommandHandler {
    /// Wrap a closure
    pub fn native<F>(handler: F) -> Self
    where
        F: Fn(&[&str]) -> Result<CommandValue> + Send + Sync + 'static,
    {
        CommandHandler::Native(Arc::new(handler))
    }

    /// Run the handler with already validated arguments
    pub fn invoke(&self, args: &[&str]) -> Result<CommandValue> {
        match self {
            CommandHandler::Native(handler) => handler(args),
            CommandHandler::Foreign(foreign) => {
                let owned = args
                    .iter()
                    .map(|arg| CString::new(*arg))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| Error::InvalidArguments("argument contains a NUL byte".to_string()))?;
                let argv: Vec<*const c_char> = owned.iter().map(|arg| arg.as_ptr()).collect();
                let argc = i32::try_from(argv.len())
                    .map_err(|_| Error::InvalidArguments("too many arguments".to_string()))?;

                // SAFETY: argv entries point into `owned`, alive until the call returns
                let call = || unsafe { (foreign.callback)(foreign.user_data, argc, argv.as_ptr()) };
                let value = match &foreign.lease {
                    Some(lease) => lease.run(call).ok_or_else(|| {
                        Error::InvalidResource("command handler of an unloaded module".to_string())
                    })?,
                    None => call(),
                };
                Ok(CommandValue::Int(value))
            }
        }
    }
}

/// Metadata of a registered command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDesc {
    pub namespace: String,
    pub name: String,
    pub usage: String,
    pub min_args: usize,
    pub max_args: usize,
}

impl CommandDesc {
    pub fn full_name(&self) -> String {
        full_name(&self.namespace, &self.name)
    }

    pub fn accepts(&self, argc: usize) -> bool {
        argc >= self.min_args && argc <= self.max_args
    }
}

struct CommandEntry {
    desc: CommandDesc,
    handler: CommandHandler,
}

fn full_name(namespace: &str, name: &str) -> String {
    format!("{}.{}", namespace, name)
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: FxHashMap<String, CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any command with the same name.
    ///
    /// Returns false (and registers nothing) if `min_args > max_args`.
    pub fn add_command(
        &mut self,
        namespace: &str,
        name: &str,
        usage: &str,
        min_args: usize,
        max_args: usize,
        handler: CommandHandler,
    ) -> bool {
        if min_args > max_args {
            crate::engine_warn!("ember3d::CommandRegistry",
                "Rejected '{}': min_args {} > max_args {}", full_name(namespace, name), min_args, max_args);
            return false;
        }

        let desc = CommandDesc {
            namespace: namespace.to_string(),
            name: name.to_string(),
            usage: usage.to_string(),
            min_args,
            max_args,
        };
        let key = desc.full_name();
        if self.commands.insert(key.clone(), CommandEntry { desc, handler }).is_some() {
            crate::engine_debug!("ember3d::CommandRegistry", "Replaced command '{}'", key);
        } else {
            crate::engine_trace!("ember3d::CommandRegistry", "Added command '{}'", key);
        }
        true
    }

    /// Remove a command. No-op (returns false) if absent.
    pub fn remove_command(&mut self, namespace: &str, name: &str) -> bool {
        self.commands.remove(&full_name(namespace, name)).is_some()
    }

    /// Remove every command of a namespace, returning how many were removed
    pub fn remove_namespace(&mut self, namespace: &str) -> usize {
        let before = self.commands.len();
        self.commands.retain(|_, entry| entry.desc.namespace != namespace);
        before - self.commands.len()
    }

    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.commands.contains_key(&full_name(namespace, name))
    }

    pub fn desc(&self, namespace: &str, name: &str) -> Option<&CommandDesc> {
        self.commands.get(&full_name(namespace, name)).map(|entry| &entry.desc)
    }

    /// Registered command names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Look up a command and check its arity, returning a handler that
    /// can be invoked after the registry is no longer borrowed.
    pub fn resolve(&self, namespace: &str, name: &str, argc: usize) -> Result<CommandHandler> {
        let key = full_name(namespace, name);
        let entry = self
            .commands
            .get(&key)
            .ok_or_else(|| Error::CommandNotFound(key.clone()))?;

        if !entry.desc.accepts(argc) {
            return Err(Error::InvalidArguments(format!(
                "'{}' takes {}..={} arguments, got {} (usage: {})",
                key, entry.desc.min_args, entry.desc.max_args, argc, entry.desc.usage
            )));
        }
        Ok(entry.handler.clone())
    }

    /// Resolve and run a command
    pub fn execute(&self, namespace: &str, name: &str, args: &[&str]) -> Result<CommandValue> {
        self.resolve(namespace, name, args.len())?.invoke(args)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

/// Split a console line (`Namespace.name arg1 arg2`) into its parts.
///
/// Returns None for blank lines or a first word without a namespace.
pub fn parse_command_line(line: &str) -> Option<(&str, &str, Vec<&str>)> {
    let mut words = line.split_whitespace();
    let (namespace, name) = words.next()?.split_once('.')?;
    if namespace.is_empty() || name.is_empty() {
        return None;
    }
    Some((namespace, name, words.collect()))
}

#[cfg(test)]
#[path = "command_registry_tests.rs"]
mod tests;
