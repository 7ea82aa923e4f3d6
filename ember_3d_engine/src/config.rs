/// Engine configuration
///
/// Passed to `Engine::initialize`. Values can be overridden from the
/// environment with `EngineConfig::from_env`:
///
/// - `EMBER3D_LOG`: minimum log severity (`trace|debug|info|warn|error`)
/// - `EMBER3D_CANVAS`: initial canvas size as `WIDTHxHEIGHT`

use crate::log::LogSeverity;

/// Environment variable holding the minimum log severity
pub const ENV_LOG: &str = "EMBER3D_LOG";

/// Environment variable holding the initial canvas size
pub const ENV_CANVAS: &str = "EMBER3D_CANVAS";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Application name (reported in the startup log)
    pub app_name: String,
    /// Initial canvas width in pixels
    pub canvas_width: u32,
    /// Initial canvas height in pixels
    pub canvas_height: u32,
    /// Minimum severity printed by the default logger
    pub log_severity: LogSeverity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "Ember3D Application".to_string(),
            canvas_width: 1280,
            canvas_height: 720,
            log_severity: if cfg!(debug_assertions) { LogSeverity::Debug } else { LogSeverity::Info },
        }
    }
}

impl EngineConfig {
    /// Default configuration with environment overrides applied
    pub fn from_env() -> Self {
        let log = std::env::var(ENV_LOG).ok();
        let canvas = std::env::var(ENV_CANVAS).ok();
        Self::default().with_overrides(log.as_deref(), canvas.as_deref())
    }

    /// Apply raw override strings. Invalid values are ignored with a warning.
    pub fn with_overrides(mut self, log: Option<&str>, canvas: Option<&str>) -> Self {
        if let Some(value) = log {
            match LogSeverity::from_name(value) {
                Some(severity) => self.log_severity = severity,
                None => crate::engine_warn!("ember3d::EngineConfig",
                    "Ignoring {}='{}': unknown severity", ENV_LOG, value),
            }
        }

        if let Some(value) = canvas {
            match parse_canvas_size(value) {
                Some((width, height)) => {
                    self.canvas_width = width;
                    self.canvas_height = height;
                }
                None => crate::engine_warn!("ember3d::EngineConfig",
                    "Ignoring {}='{}': expected WIDTHxHEIGHT", ENV_CANVAS, value),
            }
        }

        self
    }
}

/// Parse `WIDTHxHEIGHT` (both non-zero)
fn parse_canvas_size(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.trim().split_once(['x', 'X'])?;
    let width: u32 = w.trim().parse().ok()?;
    let height: u32 = h.trim().parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
