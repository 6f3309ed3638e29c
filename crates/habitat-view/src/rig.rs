//! Camera navigation modes and keyboard movement.

use std::collections::BTreeSet;

use glam::Vec3;
use habitat_core::scene::{SceneConfig, ViewModes};
use serde::Serialize;

use crate::camera::Camera;

/// World units moved per frame per held key
pub const MOVE_SPEED: f32 = 0.07;
/// Orbit distance limits
pub const ORBIT_DISTANCE: (f32, f32) = (5.0, 50.0);
/// First-person / fly distance limits
pub const FREE_DISTANCE: (f32, f32) = (0.5, 100.0);
/// Distance multiplier per wheel notch
pub const ZOOM_STEP: f32 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraMode {
    #[default]
    Orbit,
    FirstPerson,
    Fly,
}

impl CameraMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraMode::Orbit => "orbit",
            CameraMode::FirstPerson => "firstPerson",
            CameraMode::Fly => "fly",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "orbit" => Some(CameraMode::Orbit),
            "firstperson" => Some(CameraMode::FirstPerson),
            "fly" => Some(CameraMode::Fly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MoveKey {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

/// Per-scene camera vantage points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDefaults {
    pub position: Vec3,
    pub target: Vec3,
    pub view_modes: ViewModes,
}

impl CameraDefaults {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            position: config.camera_position,
            target: config.camera_target,
            view_modes: config.view_modes,
        }
    }

    /// (position, target) a mode starts from
    pub fn pose(&self, mode: CameraMode) -> (Vec3, Vec3) {
        let vm = &self.view_modes;
        match mode {
            CameraMode::Orbit => (self.position, self.target),
            CameraMode::FirstPerson => (
                Vec3::new(0.0, vm.first_person_height, vm.standoff),
                Vec3::new(0.0, vm.first_person_height, 0.0),
            ),
            CameraMode::Fly => (
                Vec3::new(0.0, vm.fly_height, vm.standoff),
                Vec3::new(0.0, vm.fly_height, 0.0),
            ),
        }
    }
}

impl Default for CameraDefaults {
    fn default() -> Self {
        Self {
            position: Vec3::new(10.0, 10.0, 10.0),
            target: Vec3::ZERO,
            view_modes: ViewModes::default(),
        }
    }
}

/// Camera pose plus exactly one active navigation mode.
///
/// While suspended (a gizmo drag is in progress) rotate, pan and zoom
/// input is dropped.
#[derive(Debug, Clone)]
pub struct CameraRig {
    camera: Camera,
    mode: CameraMode,
    defaults: CameraDefaults,
    keys: BTreeSet<MoveKey>,
    suspended: bool,
}

impl CameraRig {
    pub fn new(aspect: f32, defaults: CameraDefaults) -> Self {
        let mut rig = Self {
            camera: Camera::new(aspect),
            mode: CameraMode::Orbit,
            defaults,
            keys: BTreeSet::new(),
            suspended: false,
        };
        rig.apply_pose();
        rig
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn defaults(&self) -> &CameraDefaults {
        &self.defaults
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
    }

    /// New scene defaults; the pose snaps to them in the current mode
    pub fn set_defaults(&mut self, defaults: CameraDefaults) {
        self.defaults = defaults;
        self.apply_pose();
    }

    fn apply_pose(&mut self) {
        let (position, target) = self.defaults.pose(self.mode);
        self.camera.set_position(position);
        self.camera.set_target(target);
    }

    /// Switch mode, resetting pose and held keys. Returns false if already active.
    pub fn set_mode(&mut self, mode: CameraMode) -> bool {
        if self.mode == mode {
            return false;
        }
        log::debug!("camera mode {} -> {}", self.mode.as_str(), mode.as_str());
        self.mode = mode;
        self.keys.clear();
        self.apply_pose();
        true
    }

    /// Back to the scene's orbit vantage
    pub fn reset(&mut self) {
        self.mode = CameraMode::Orbit;
        self.keys.clear();
        self.apply_pose();
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn distance_range(&self) -> (f32, f32) {
        match self.mode {
            CameraMode::Orbit => ORBIT_DISTANCE,
            CameraMode::FirstPerson | CameraMode::Fly => FREE_DISTANCE,
        }
    }

    /// Held only in first-person and fly; ignored (false) in orbit
    pub fn key_down(&mut self, key: MoveKey) -> bool {
        if self.mode == CameraMode::Orbit {
            return false;
        }
        self.keys.insert(key);
        true
    }

    pub fn key_up(&mut self, key: MoveKey) {
        self.keys.remove(&key);
    }

    pub fn held_keys(&self) -> impl Iterator<Item = MoveKey> + '_ {
        self.keys.iter().copied()
    }

    /// Orbit around the target (radians)
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) -> bool {
        if self.suspended {
            return false;
        }
        self.camera.orbit(delta_yaw, delta_pitch);
        true
    }

    /// Screen-plane pan, orbit mode only
    pub fn pan(&mut self, dx: f32, dy: f32) -> bool {
        if self.suspended || self.mode != CameraMode::Orbit {
            return false;
        }
        self.camera.pan(dx, dy);
        true
    }

    /// Dolly toward (negative notches) or away from the target
    pub fn zoom(&mut self, notches: f32) -> bool {
        if self.suspended {
            return false;
        }
        let (min, max) = self.distance_range();
        let distance = self.camera.distance() * ZOOM_STEP.powf(notches);
        self.camera.set_distance(distance, min, max);
        true
    }

    /// Apply one frame of keyboard movement. Returns true if the camera moved.
    pub fn tick(&mut self) -> bool {
        if self.mode == CameraMode::Orbit || self.keys.is_empty() {
            return false;
        }
        let orientation = self.camera.orientation();
        let flat = |v: Vec3| Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
        let forward = flat(orientation * Vec3::NEG_Z);
        let right = flat(orientation * Vec3::X);

        let mut horizontal = Vec3::ZERO;
        let mut vertical = 0.0;
        for key in &self.keys {
            match key {
                MoveKey::Forward => horizontal += forward,
                MoveKey::Back => horizontal -= forward,
                MoveKey::Right => horizontal += right,
                MoveKey::Left => horizontal -= right,
                MoveKey::Up => vertical += 1.0,
                MoveKey::Down => vertical -= 1.0,
            }
        }
        let displacement = (horizontal + Vec3::Y * vertical) * MOVE_SPEED;
        if displacement == Vec3::ZERO {
            return false;
        }

        let old_target = self.camera.target;
        let position = self.camera.position + displacement;
        let look = if forward == Vec3::ZERO {
            // straight up or down: keep the old horizontal offset
            Vec3::new(old_target.x - self.camera.position.x, 0.0, old_target.z - self.camera.position.z)
        } else {
            forward
        };
        self.camera.set_position(position);
        self.camera.set_target(Vec3::new(
            position.x + look.x,
            old_target.y + displacement.y,
            position.z + look.z,
        ));
        true
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(1.0, CameraDefaults::default())
    }
}
