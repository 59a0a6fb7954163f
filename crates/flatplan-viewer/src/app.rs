//! Bevy application setup

use bevy::prelude::*;
use bevy::winit::WinitSettings;
use flatplan_core::config::ViewerConfig;
use flatplan_core::Viewer;

use crate::camera::CameraPlugin;
use crate::convert::color;
use crate::input::InputPlugin;
use crate::models::ModelsPlugin;
use crate::scene::ScenePlugin;

/// Interaction, camera and load state shared by all systems
#[derive(Resource)]
pub struct ViewerState {
    pub viewer: Viewer,
}

/// Configuration the viewer was started with
#[derive(Resource, Clone)]
pub struct ViewerSettings(pub ViewerConfig);

/// Run the Bevy application
pub fn run(config: ViewerConfig) {
    let viewer = Viewer::new(&config);

    App::new()
        .insert_resource(ClearColor(color(config.colors.background)))
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Flatplan".to_string(),
                    canvas: Some("#flatplan-canvas".to_string()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Models are served next to the page
                file_path: "".to_string(),
                // No .meta files on the server
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // Redraw every display tick
        .insert_resource(WinitSettings::game())
        .insert_resource(ViewerState { viewer })
        .insert_resource(ViewerSettings(config))
        .add_plugins(ScenePlugin)
        .add_plugins(ModelsPlugin)
        .add_plugins(InputPlugin)
        .add_plugins(CameraPlugin)
        .run();
}
