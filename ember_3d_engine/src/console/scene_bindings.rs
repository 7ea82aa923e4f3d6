/// Built-in `Scene.*` console commands
///
/// Thin adapters from parsed console arguments to the engine's scene
/// operations. Camera ids are returned as integers, `-1` when missing.

use glam::{Vec3, Vec4};
use crate::camera::CameraId;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::scene::DirectionalLight;
use super::command_registry::{CommandHandler, CommandRegistry, CommandValue};

pub const SCENE_NAMESPACE: &str = "Scene";

/// Register every `Scene.*` command
pub(crate) fn register_scene_commands(registry: &mut CommandRegistry) {
    registry.add_command(SCENE_NAMESPACE, "addEntity", "Scene.addEntity <name> [group]", 1, 2,
        CommandHandler::native(|args| {
            Engine::add_entity(args[0], args.get(1).copied())?;
            Ok(CommandValue::Void)
        }));

    registry.add_command(SCENE_NAMESPACE, "removeEntity", "Scene.removeEntity <name>", 1, 1,
        CommandHandler::native(|args| {
            Engine::remove_entity(args[0])?;
            Ok(CommandValue::Void)
        }));

    registry.add_command(SCENE_NAMESPACE, "getActiveCamera", "Scene.getActiveCamera", 0, 0,
        CommandHandler::native(|_| {
            let id = Engine::get_active_camera()?;
            Ok(CommandValue::Int(CameraId::script_id(id)))
        }));

    registry.add_command(SCENE_NAMESPACE, "pushActiveCamera", "Scene.pushActiveCamera <name>", 1, 1,
        CommandHandler::native(|args| {
            Engine::push_active_camera(args[0])?;
            Ok(CommandValue::Void)
        }));

    registry.add_command(SCENE_NAMESPACE, "popActiveCamera", "Scene.popActiveCamera", 0, 0,
        CommandHandler::native(|_| {
            Engine::pop_active_camera()?;
            Ok(CommandValue::Void)
        }));

    registry.add_command(SCENE_NAMESPACE, "getCamera", "Scene.getCamera <name>", 1, 1,
        CommandHandler::native(|args| {
            let id = Engine::get_camera(args[0])?;
            Ok(CommandValue::Int(CameraId::script_id(id)))
        }));

    registry.add_command(SCENE_NAMESPACE, "setDirectionalLight",
        "Scene.setDirectionalLight <x,y,z> <r,g,b[,a]> <r,g,b[,a]>", 3, 3,
        CommandHandler::native(|args| {
            let light = parse_directional_light(args[0], args[1], args[2])?;
            Engine::set_directional_light(light)?;
            Ok(CommandValue::Void)
        }));
}

fn parse_floats(text: &str) -> Result<Vec<f32>> {
    text.split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| Error::InvalidArguments(format!("'{}' is not a comma-separated number list", text)))
}

pub(crate) fn parse_vec3(text: &str) -> Result<Vec3> {
    match parse_floats(text)?.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(Error::InvalidArguments(format!("'{}' must have 3 components", text))),
    }
}

/// `r,g,b` (alpha 1) or `r,g,b,a`
pub(crate) fn parse_color(text: &str) -> Result<Vec4> {
    match parse_floats(text)?.as_slice() {
        [r, g, b] => Ok(Vec4::new(*r, *g, *b, 1.0)),
        [r, g, b, a] => Ok(Vec4::new(*r, *g, *b, *a)),
        _ => Err(Error::InvalidArguments(format!("'{}' must have 3 or 4 components", text))),
    }
}

pub(crate) fn parse_directional_light(direction: &str, color: &str, ambient: &str) -> Result<DirectionalLight> {
    let direction = parse_vec3(direction)?;
    if direction.length_squared() == 0.0 {
        return Err(Error::InvalidArguments("light direction must not be zero".to_string()));
    }
    Ok(DirectionalLight::new(direction, parse_color(color)?, parse_color(ambient)?))
}

#[cfg(test)]
#[path = "scene_bindings_tests.rs"]
mod tests;
