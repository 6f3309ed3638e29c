//! The interactive session: scene instances, camera, picking and selection
//! driven by platform-neutral input.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use glam::{Mat4, Vec2};
use habitat_core::assets::{AssetGeometry, AssetLoadError, AssetSource};
use habitat_core::components::{world_matrix, ModuleInfo, Parent, Primitive};
use habitat_core::scene::{despawn_module, spawn_module, SceneConfig};
use habitat_core::{EntityId, World};

use crate::events::{SelectionDetails, ViewerEvent};
use crate::gizmo::GizmoMode;
use crate::input::{key_action, KeyAction, PointerButton, CLICK_TOLERANCE, PAN_SPEED, ROTATE_SPEED};
use crate::mesh::{proxy_color, proxy_model_matrix};
use crate::picking::pick;
use crate::rig::{CameraDefaults, CameraMode, CameraRig};
use crate::scene_index::SceneGraphIndex;
use crate::selection::SelectionController;

/// Identifies one asset load of one mount. Completions carrying a ticket
/// from an earlier mount are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub epoch: u64,
    pub module_id: String,
}

/// An asset the host must fetch and hand back via [`Viewer::complete_load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub ticket: LoadTicket,
    pub asset_path: String,
}

/// One proxy box for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyDraw {
    pub model: Mat4,
    pub color: [f32; 4],
    pub owner: EntityId,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureKind {
    Gizmo,
    Camera,
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    button: PointerButton,
    kind: GestureKind,
    start: Vec2,
    last: Vec2,
    moved: bool,
}

pub struct Viewer {
    world: World,
    index: SceneGraphIndex,
    config: Option<Rc<SceneConfig>>,
    instances: BTreeMap<String, EntityId>,
    pending: BTreeSet<String>,
    epoch: u64,
    config_load: u64,
    rig: CameraRig,
    selection: SelectionController,
    gesture: Option<Gesture>,
    events: Vec<ViewerEvent>,
}

impl Viewer {
    pub fn new(aspect: f32) -> Self {
        Self {
            world: World::new(),
            index: SceneGraphIndex::new(),
            config: None,
            instances: BTreeMap::new(),
            pending: BTreeSet::new(),
            epoch: 0,
            config_load: 0,
            rig: CameraRig::new(aspect, CameraDefaults::default()),
            selection: SelectionController::new(),
            gesture: None,
            events: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn index(&self) -> &SceneGraphIndex {
        &self.index
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.rig.mode()
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn config(&self) -> Option<&Rc<SceneConfig>> {
        self.config.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.config.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Owner entity of a loaded module
    pub fn instance(&self, module_id: &str) -> Option<EntityId> {
        self.instances.get(module_id).copied()
    }

    pub fn instance_ids(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.rig.set_aspect(aspect);
    }

    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- scene lifecycle ----

    /// Start fetching a scene document. Fetches begun earlier become stale,
    /// as does any fetch outstanding when the scene is mounted or unmounted.
    pub fn begin_config_load(&mut self) -> u64 {
        self.config_load += 1;
        self.config_load
    }

    /// Whether a fetched document may still be mounted
    pub fn is_current_load(&self, load: u64) -> bool {
        self.config_load == load
    }

    /// Replace the current scene with `config`. Returns the assets to load;
    /// instances appear as their loads complete.
    pub fn mount(&mut self, config: Rc<SceneConfig>) -> Vec<AssetRequest> {
        self.unmount();
        self.epoch += 1;

        let before = self.rig.mode();
        self.rig.set_defaults(CameraDefaults::from_config(&config));
        self.rig.reset();
        if before != CameraMode::Orbit {
            self.events.push(ViewerEvent::CameraModeChanged {
                mode: CameraMode::Orbit,
            });
        }

        let requests: Vec<AssetRequest> = config
            .base_model
            .iter()
            .filter(|d| !d.hidden)
            .chain(config.visible_modules())
            .map(|d| AssetRequest {
                ticket: LoadTicket {
                    epoch: self.epoch,
                    module_id: d.id.clone(),
                },
                asset_path: d.asset_path.clone(),
            })
            .collect();
        self.pending = requests.iter().map(|r| r.ticket.module_id.clone()).collect();

        log::info!(
            "mounted scene {} ({} assets to load)",
            config.id,
            requests.len()
        );
        self.events.push(ViewerEvent::SceneMounted {
            id: config.id.clone(),
        });
        self.config = Some(config);
        requests
    }

    /// Mount and resolve every asset synchronously through `source`
    pub fn mount_with(&mut self, config: Rc<SceneConfig>, source: &impl AssetSource) -> usize {
        let requests = self.mount(config);
        requests
            .into_iter()
            .filter_map(|request| {
                let result = source.load(&request.asset_path);
                self.complete_load(&request.ticket, result)
            })
            .count()
    }

    /// Deliver an asset load result. Stale or unknown tickets are ignored.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<AssetGeometry, AssetLoadError>,
    ) -> Option<EntityId> {
        if ticket.epoch != self.epoch || !self.pending.remove(&ticket.module_id) {
            log::debug!(
                "dropping stale load of {} (epoch {})",
                ticket.module_id,
                ticket.epoch
            );
            return None;
        }
        let config = Rc::clone(self.config.as_ref()?);
        let descriptor = config.descriptors().find(|d| d.id == ticket.module_id)?;

        match result {
            Ok(geometry) => {
                let spawned = spawn_module(&mut self.world, descriptor, &geometry);
                for &primitive in &spawned.primitives {
                    self.index
                        .register(primitive, spawned.owner, descriptor.interactive);
                }
                self.instances.insert(descriptor.id.clone(), spawned.owner);
                self.events.push(ViewerEvent::ModuleLoaded {
                    id: descriptor.id.clone(),
                });
                Some(spawned.owner)
            }
            Err(err) => {
                log::warn!("module {} omitted: {err}", descriptor.id);
                self.events.push(ViewerEvent::ModuleFailed {
                    id: descriptor.id.clone(),
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    /// Destroy every instance and invalidate in-flight loads
    pub fn unmount(&mut self) {
        self.config_load += 1;
        let Some(config) = self.config.take() else {
            return;
        };
        let ids: Vec<String> = self.instances.keys().cloned().collect();
        for id in ids {
            self.destroy_instance(&id);
        }
        self.index.clear();
        self.pending.clear();
        self.gesture = None;
        self.epoch += 1;
        log::info!("unmounted scene {}", config.id);
        self.events.push(ViewerEvent::SceneUnmounted {
            id: config.id.clone(),
        });
    }

    /// Remove one instance with its registrations and any selection of it
    pub fn destroy_instance(&mut self, module_id: &str) -> bool {
        let Some(owner) = self.instances.remove(module_id) else {
            return false;
        };
        if self.selection.on_instance_destroyed(owner) {
            self.gesture = None;
            self.events
                .push(ViewerEvent::SelectionChanged { details: None });
        }
        self.sync_camera_suspension();
        self.index.unregister_all(owner);
        despawn_module(&mut self.world, owner);
        true
    }

    // ---- selection ----

    pub fn selected(&self) -> Option<EntityId> {
        self.selection.selected()
    }

    pub fn selection_details(&self) -> Option<SelectionDetails> {
        SelectionDetails::of(&self.world, self.selection.selected()?)
    }

    /// Resolve a click at `ndc` to a module and select it, or clear on a miss.
    /// Ignored outside orbit mode.
    pub fn click(&mut self, ndc: Vec2) -> Option<EntityId> {
        if self.rig.mode() != CameraMode::Orbit {
            return None;
        }
        let candidates = self.index.candidates(&self.world);
        let owner = pick(ndc, self.rig.camera(), &candidates)
            .and_then(|hit| self.index.resolve_owner(&self.world, hit.primitive));
        self.apply_selection(owner);
        self.selection.selected()
    }

    /// Select a loaded, interactive module by descriptor id
    pub fn select_module(&mut self, module_id: &str) -> bool {
        if self.rig.mode() != CameraMode::Orbit {
            return false;
        }
        let Some(owner) = self.instance(module_id) else {
            return false;
        };
        let interactive = self
            .world
            .get::<ModuleInfo>(owner)
            .is_some_and(|info| info.interactive);
        if !interactive {
            return false;
        }
        self.apply_selection(Some(owner));
        true
    }

    pub fn close_details(&mut self) -> bool {
        self.apply_selection(None)
    }

    fn apply_selection(&mut self, owner: Option<EntityId>) -> bool {
        let changed = self.selection.select(&self.world, owner);
        if changed {
            self.events.push(ViewerEvent::SelectionChanged {
                details: self.selection_details(),
            });
        }
        self.sync_camera_suspension();
        changed
    }

    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) -> bool {
        self.selection.gizmo_mut().set_mode(mode)
    }

    pub fn gizmo_mode(&self) -> GizmoMode {
        self.selection.gizmo().mode()
    }

    /// Reset the selected module to the neutral transform
    pub fn reset_selected_transform(&mut self) -> bool {
        if !self.selection.gizmo_mut().reset_transform(&mut self.world) {
            return false;
        }
        self.emit_transform_changed();
        true
    }

    fn emit_transform_changed(&mut self) {
        if let Some(details) = self.selection_details() {
            self.events.push(ViewerEvent::TransformChanged { details });
        }
    }

    // ---- camera ----

    pub fn set_camera_mode(&mut self, mode: CameraMode) -> bool {
        if !self.rig.set_mode(mode) {
            return false;
        }
        self.after_mode_change();
        true
    }

    /// Back to the config's orbit vantage. Ignored while a gizmo drag holds the camera.
    pub fn reset_camera(&mut self) -> bool {
        if self.rig.is_suspended() {
            log::debug!("camera reset ignored during gizmo drag");
            return false;
        }
        let before = self.rig.mode();
        self.rig.reset();
        if self.rig.mode() != before {
            self.after_mode_change();
        }
        true
    }

    fn after_mode_change(&mut self) {
        let mode = self.rig.mode();
        log::debug!("camera mode {}", mode.as_str());
        self.events.push(ViewerEvent::CameraModeChanged { mode });
        if self.selection.on_camera_mode(mode) {
            self.gesture = None;
            self.events
                .push(ViewerEvent::SelectionChanged { details: None });
        }
        self.sync_camera_suspension();
    }

    // ---- input ----

    /// Starts a gesture. A gesture whose release never arrived is abandoned first.
    pub fn pointer_down(&mut self, ndc: Vec2, button: PointerButton) {
        if let Some(stale) = self.gesture.take() {
            log::debug!("abandoning {:?} gesture without release", stale.kind);
            self.selection.gizmo_mut().drag_end();
            self.sync_camera_suspension();
        }
        let mut kind = GestureKind::Camera;
        if button == PointerButton::Primary && self.rig.mode() == CameraMode::Orbit {
            let camera = self.rig.camera();
            let ray = camera.screen_to_ray(ndc);
            let eye = camera.position;
            if self.selection.gizmo_mut().drag_start(&self.world, &ray, eye) {
                kind = GestureKind::Gizmo;
            }
        }
        self.sync_camera_suspension();
        self.gesture = Some(Gesture {
            button,
            kind,
            start: ndc,
            last: ndc,
            moved: false,
        });
    }

    pub fn pointer_move(&mut self, ndc: Vec2) {
        let Some(mut gesture) = self.gesture else {
            let camera = self.rig.camera();
            let ray = camera.screen_to_ray(ndc);
            let eye = camera.position;
            self.selection.gizmo_mut().hover(&ray, eye);
            return;
        };

        let delta = ndc - gesture.last;
        gesture.last = ndc;
        gesture.moved |= ndc.distance(gesture.start) > CLICK_TOLERANCE;
        self.gesture = Some(gesture);

        match gesture.kind {
            GestureKind::Gizmo => {
                let camera = self.rig.camera();
                let ray = camera.screen_to_ray(ndc);
                let eye = camera.position;
                if self
                    .selection
                    .gizmo_mut()
                    .drag_move(&mut self.world, &ray, eye)
                {
                    self.emit_transform_changed();
                }
            }
            GestureKind::Camera => match gesture.button {
                PointerButton::Primary => {
                    self.rig
                        .rotate(delta.x * ROTATE_SPEED, -delta.y * ROTATE_SPEED);
                }
                PointerButton::Secondary | PointerButton::Middle => {
                    self.rig.pan(-delta.x * PAN_SPEED, -delta.y * PAN_SPEED);
                }
            },
        }
    }

    /// Ends the gesture; a primary press that barely moved is a click
    pub fn pointer_up(&mut self, ndc: Vec2) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let moved = gesture.moved || ndc.distance(gesture.start) > CLICK_TOLERANCE;
        match gesture.kind {
            GestureKind::Gizmo => {
                self.selection.gizmo_mut().drag_end();
                self.sync_camera_suspension();
            }
            GestureKind::Camera if gesture.button == PointerButton::Primary && !moved => {
                self.click(ndc);
            }
            GestureKind::Camera => {}
        }
    }

    /// Positive `delta` zooms out
    pub fn wheel(&mut self, delta: f32) -> bool {
        self.rig.zoom(delta)
    }

    /// Returns true if the key is bound
    pub fn key_down(&mut self, key: &str) -> bool {
        match key_action(key) {
            Some(KeyAction::Move(key)) => {
                self.rig.key_down(key);
            }
            Some(KeyAction::ResetCamera) => {
                self.reset_camera();
            }
            Some(KeyAction::GizmoMode(mode)) => {
                self.set_gizmo_mode(mode);
            }
            None => return false,
        }
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match key_action(key) {
            Some(KeyAction::Move(key)) => {
                self.rig.key_up(key);
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Per-frame update. Returns true if the camera moved.
    pub fn tick(&mut self) -> bool {
        let moved = self.rig.tick();
        self.selection.gizmo_mut().sync(&self.world);
        moved
    }

    /// Mirror the gizmo drag into camera suspension, reporting every edge.
    /// Drags end through pointer-up, deselection, mode switches and teardown alike.
    fn sync_camera_suspension(&mut self) {
        let dragging = self.selection.gizmo().is_dragging();
        if self.rig.is_suspended() == dragging {
            return;
        }
        self.rig.set_suspended(dragging);
        self.events.push(ViewerEvent::DragStateChanged { dragging });
    }

    // ---- rendering ----

    /// Proxy boxes for every primitive of every instance, in entity order
    pub fn draw_list(&self) -> Vec<ProxyDraw> {
        let selected = self.selection.selected();
        self.world
            .iter_with::<Primitive>()
            .filter_map(|(entity, primitive)| {
                let owner = self
                    .index
                    .owner_of(entity)
                    .or_else(|| self.world.get::<Parent>(entity).map(|p| p.0))?;
                let info = self.world.get::<ModuleInfo>(owner)?;
                let is_selected = selected == Some(owner);
                let mut color = proxy_color(&info.module_type);
                if is_selected {
                    color = color.map(|c| (c * 1.3).min(1.0));
                    color[3] = 1.0;
                }
                Some(ProxyDraw {
                    model: proxy_model_matrix(&primitive.bounds, world_matrix(&self.world, entity)),
                    color,
                    owner,
                    selected: is_selected,
                })
            })
            .collect()
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
