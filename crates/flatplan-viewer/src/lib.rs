//! Flatplan Viewer - interactive 3D floor plan
//!
//! Renders the apartment model with clickable hot zones. Clicking lamps and
//! ceilings toggles lighting effects; clicking A/C units toggles their
//! snowflakes. Dragging orbits the camera, scrolling zooms.

pub mod app;
mod camera;
mod convert;
mod input;
mod models;
mod scene;

pub use app::run;

use flatplan_core::config::ViewerConfig;

/// Configuration bundled into the web build
pub const EMBEDDED_CONFIG: &str = include_str!("../flatplan.toml");

/// Embedded configuration, falling back to defaults if it does not parse
pub fn embedded_config() -> ViewerConfig {
    ViewerConfig::from_toml(EMBEDDED_CONFIG).unwrap_or_else(|e| {
        tracing::warn!("Embedded configuration invalid, using defaults: {}", e);
        ViewerConfig::default()
    })
}

/// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    app::run(embedded_config());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_parses() {
        let config = ViewerConfig::from_toml(EMBEDDED_CONFIG).unwrap();
        assert_eq!(config.assets.floor_plan, "model/flatplan.glb");
        assert_eq!(config.interaction.drag_tolerance, 1);
    }
}
