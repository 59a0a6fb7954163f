//! Asynchronous scene assembly
//!
//! Model loading is delegated to an [`AssetSource`]. Each load resolves
//! exactly once with a `Result`; the [`Viewer`] takes the results in whatever
//! order they complete. Decorations never wait on the floor plan, and a
//! failed floor plan leaves the rest of the viewer usable.

use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::stream::{FuturesUnordered, StreamExt};
use glam::{Vec2, Vec3};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::camera::{CameraFrame, OrbitControls, PerspectiveCamera};
use crate::config::{AssetsConfig, ViewerConfig};
use crate::controller::{ClickOutcome, InteractionController};
use crate::fixture::{CoolingPalette, SNOWFLAKE_SCALE};
use crate::geometry::{Ray, Transform};
use crate::scene::{MaterialSet, SceneNode};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loader collaborator producing scene nodes from model files
pub trait AssetSource {
    fn load_mesh(&self, path: &str) -> impl Future<Output = Result<SceneNode, LoadError>>;

    fn load_materials(&self, path: &str) -> impl Future<Output = Result<MaterialSet, LoadError>>;
}

/// Scale a loaded snowflake, move it to `position` and paint it neutral
pub fn prepare_decoration(mut node: SceneNode, position: Vec3, palette: &CoolingPalette) -> SceneNode {
    *node.transform_mut() = Transform::from_translation(position).with_scale(Vec3::splat(SNOWFLAKE_SCALE));
    node.set_color(palette.neutral);
    node
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FloorPlanStatus {
    #[default]
    Loading,
    Loaded,
    Failed(String),
}

/// Camera, navigation and interaction state of one floor-plan view
pub struct Viewer {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub controller: InteractionController,
    status: FloorPlanStatus,
    frame: Option<CameraFrame>,
    floor_plan: Option<SceneNode>,
}

impl Viewer {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            camera: config.camera.to_camera(),
            controls: config.camera.to_controls(),
            controller: InteractionController::from_config(config),
            status: FloorPlanStatus::Loading,
            frame: None,
            floor_plan: None,
        }
    }

    pub fn status(&self) -> &FloorPlanStatus {
        &self.status
    }

    /// Framing computed when the floor plan arrived
    pub fn frame(&self) -> Option<&CameraFrame> {
        self.frame.as_ref()
    }

    pub fn floor_plan(&self) -> Option<&SceneNode> {
        self.floor_plan.as_ref()
    }

    /// Take the floor-plan load result. On success the camera and orbit
    /// limits are fitted to the model; on failure they stay as they are.
    pub fn attach_floor_plan(&mut self, result: Result<SceneNode, LoadError>) -> Option<CameraFrame> {
        match result {
            Ok(node) => {
                let bounds = node.world_bounds();
                self.status = FloorPlanStatus::Loaded;
                self.frame = CameraFrame::from_bounds(&bounds, &self.camera);
                match self.frame {
                    Some(frame) => {
                        frame.apply(&mut self.camera);
                        self.controls.fit(&frame);
                        // Settle the framed pose inside the new orbit limits
                        self.controls.update(&mut self.camera);
                        info!(
                            meshes = node.mesh_count(),
                            size = frame.size,
                            distance = frame.distance,
                            "Floor plan loaded and framed"
                        );
                    }
                    None => warn!("Floor plan has no mesh bounds, keeping default camera"),
                }
                self.floor_plan = Some(node);
                self.frame
            }
            Err(e) => {
                error!("Failed to load floor plan: {}", e);
                self.status = FloorPlanStatus::Failed(e.to_string());
                None
            }
        }
    }

    /// Take a decoration load result for `slot`. Failures leave the slot
    /// empty; the zone stays clickable.
    pub fn attach_decoration(&mut self, slot: usize, result: Result<SceneNode, LoadError>) -> bool {
        match result {
            Ok(node) => {
                let attached = self.controller.attach_decoration(slot, node);
                if attached {
                    debug!(slot, "Decoration attached");
                } else {
                    warn!(slot, "No decoration slot");
                }
                attached
            }
            Err(e) => {
                warn!(slot, "Failed to load decoration: {}", e);
                false
            }
        }
    }

    pub fn pointer_ray(&self, pointer: Vec2, surface_size: Vec2) -> Ray {
        self.camera.ray_from_pointer(pointer, surface_size)
    }

    pub fn pointer_down(&mut self) {
        self.controller.pointer_down();
    }

    pub fn pointer_move(&mut self, pointer: Vec2, surface_size: Vec2) -> bool {
        let ray = self.pointer_ray(pointer, surface_size);
        self.controller.pointer_move(&ray)
    }

    pub fn pointer_up(&mut self, pointer: Vec2, surface_size: Vec2) -> ClickOutcome {
        let ray = self.pointer_ray(pointer, surface_size);
        self.controller.pointer_up(&ray)
    }
}

enum Loaded {
    FloorPlan(Result<SceneNode, LoadError>),
    Decoration(usize, Result<SceneNode, LoadError>),
}

/// Drives every model load of the floor plan view through an [`AssetSource`]
pub struct SceneAssembler<'a, S: AssetSource> {
    source: &'a S,
    assets: AssetsConfig,
    decoration_positions: Vec<Vec3>,
    palette: CoolingPalette,
}

impl<'a, S: AssetSource> SceneAssembler<'a, S> {
    pub fn new(source: &'a S, config: &ViewerConfig, viewer: &Viewer) -> Self {
        Self {
            source,
            assets: config.assets.clone(),
            decoration_positions: viewer.controller.layout().snowflake_positions(),
            palette: *viewer.controller.palette(),
        }
    }

    /// Materials first, all forced double-sided, then the mesh they dress
    pub async fn load_floor_plan(&self) -> Result<SceneNode, LoadError> {
        let mut materials = self.source.load_materials(&self.assets.floor_plan_materials).await?;
        materials.force_double_sided();
        let mut node = self.source.load_mesh(&self.assets.floor_plan).await?;
        node.apply_materials(&materials);
        info!(materials = materials.len(), path = %self.assets.floor_plan, "Floor plan model ready");
        Ok(node)
    }

    pub async fn load_decoration(&self, slot: usize) -> Result<SceneNode, LoadError> {
        let position = self
            .decoration_positions
            .get(slot)
            .copied()
            .ok_or_else(|| LoadError::NotFound(format!("decoration slot {slot}")))?;
        let node = self.source.load_mesh(&self.assets.snowflake).await?;
        Ok(prepare_decoration(node, position, &self.palette))
    }

    /// Run all loads concurrently, handing each result to `viewer` as it
    /// completes
    pub async fn run(&self, viewer: &mut Viewer) {
        let mut pending: FuturesUnordered<LocalBoxFuture<'_, Loaded>> = FuturesUnordered::new();
        pending.push(async { Loaded::FloorPlan(self.load_floor_plan().await) }.boxed_local());
        for slot in 0..self.decoration_positions.len() {
            pending.push(async move { Loaded::Decoration(slot, self.load_decoration(slot).await) }.boxed_local());
        }

        while let Some(loaded) = pending.next().await {
            match loaded {
                Loaded::FloorPlan(result) => {
                    viewer.attach_floor_plan(result);
                }
                Loaded::Decoration(slot, result) => {
                    viewer.attach_decoration(slot, result);
                }
            }
        }
    }
}
