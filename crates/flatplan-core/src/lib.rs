//! Flatplan core: hot zones, toggle state and camera math for an interactive
//! floor-plan viewer
//!
//! This crate is independent of any rendering engine. It models the fixed
//! apartment layout, hit-tests pointer rays against its zones, tracks which
//! lights and air conditioners are on, and frames the camera around the
//! loaded floor plan. A front end mirrors this state onto its scene.

pub mod assets;
pub mod camera;
pub mod config;
pub mod controller;
pub mod effect;
pub mod fixture;
pub mod geometry;
pub mod layout;
pub mod scene;
pub mod viewport;
pub mod zone;

pub use assets::{AssetSource, FloorPlanStatus, LoadError, SceneAssembler, Viewer};
pub use camera::{CameraFrame, OrbitControls, PerspectiveCamera};
pub use config::{load_config, ConfigError, ViewerConfig};
pub use controller::{ClickOutcome, InteractionController};
pub use geometry::{Aabb, Orientation, Ray, Transform};
pub use layout::FloorPlanLayout;
pub use scene::{Material, MaterialSet, NodeVisitor, Rgb, SceneNode};
pub use viewport::Surface;
pub use zone::{Zone, ZoneShape};
