//! ブラウザ向けファサード
//!
//! JSからシーンの読み込み、入力、選択、Gizmo操作、イベント購読を行う

mod fetch;
mod renderer;
mod shaders;
mod subscription;
mod utils;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use glam::Vec3;
use js_sys::{Function, Promise};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::HtmlCanvasElement;

use habitat_core::scene::SceneConfigStore;
use habitat_view::{AssetRequest, CameraMode, GizmoMode, PointerButton, Viewer};

use renderer::Renderer;
use subscription::SubscriptionManager;
use utils::{console_log, pixel_to_ndc, wheel_notches};

// パニック時のスタックトレース表示とlog出力先の登録
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    utils::init_logger(log::LevelFilter::Info);
}

struct Session {
    viewer: Viewer,
    store: SceneConfigStore,
    subscriptions: SubscriptionManager<Function>,
    renderer: Renderer,
    disposed: bool,
}

type Shared = Rc<RefCell<Session>>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CameraSnapshot {
    mode: CameraMode,
    position: Vec3,
    target: Vec3,
    dragging: bool,
}

/// JSON互換の形（None は null、マップはプレーンオブジェクト）でJSへ渡す
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn error_to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// 溜まったイベントを購読者へ配送する。
/// コールバックから再入できるよう、借用を外してから呼び出す
fn dispatch(shared: &Shared) {
    let deliveries: Vec<(Function, JsValue)> = {
        let mut session = shared.borrow_mut();
        let events = session.viewer.drain_events();
        let mut deliveries = Vec::new();
        for event in &events {
            let callbacks = session.subscriptions.callbacks_for(event.kind());
            if callbacks.is_empty() {
                continue;
            }
            match to_js(event) {
                Ok(value) => {
                    deliveries.extend(callbacks.into_iter().map(|cb| (cb, value.clone())));
                }
                Err(err) => log::warn!("could not serialize {} event: {err:?}", event.kind()),
            }
        }
        deliveries
    };

    for (callback, value) in deliveries {
        if let Err(err) = callback.call1(&JsValue::NULL, &value) {
            log::warn!("event subscriber threw: {err:?}");
        }
    }
}

/// アセットを非同期に取得し、同じマウント中であればインスタンス化する
fn spawn_asset_load(shared: Shared, request: AssetRequest) {
    spawn_local(async move {
        if shared.borrow().viewer.epoch() != request.ticket.epoch {
            return;
        }
        let result = fetch::fetch_asset(&request.asset_path).await;
        {
            let mut session = shared.borrow_mut();
            if session.disposed {
                return;
            }
            session.viewer.complete_load(&request.ticket, result);
        }
        dispatch(&shared);
    });
}

/// シーン設定を取得（キャッシュ優先）してマウントし、アセット読み込みを開始する。
/// `load`が古くなっていれば（後続の読み込みやアンマウント）結果を捨て、nullで解決する
async fn load_and_mount(shared: Shared, id: String, load: u64) -> Result<JsValue, JsValue> {
    let cached = shared.borrow().store.cached(&id);
    let config = match cached {
        Some(config) => config,
        None => {
            let text = fetch::fetch_config(&id).await.map_err(error_to_js)?;
            shared
                .borrow_mut()
                .store
                .ingest(&id, &text)
                .map_err(error_to_js)?
        }
    };

    let requests = {
        let mut session = shared.borrow_mut();
        if session.disposed {
            return Err(JsValue::from_str("viewer has been disposed"));
        }
        if !session.viewer.is_current_load(load) {
            log::info!("scene {id} superseded before mount");
            return Ok(JsValue::NULL);
        }
        session.viewer.mount(config)
    };
    dispatch(&shared);

    let count = requests.len();
    for request in requests {
        spawn_asset_load(Rc::clone(&shared), request);
    }
    Ok(JsValue::from(count as u32))
}

/// JSに公開するViewer
#[wasm_bindgen(js_name = Viewer)]
pub struct WebViewer {
    shared: Shared,
}

impl WebViewer {
    /// セッションを操作し、発生したイベントを配送する
    fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let result = f(&mut self.shared.borrow_mut());
        dispatch(&self.shared);
        result
    }

    fn ndc(session: &Session, x: f32, y: f32) -> glam::Vec2 {
        pixel_to_ndc(x, y, session.renderer.width(), session.renderer.height())
    }
}

#[wasm_bindgen(js_class = Viewer)]
impl WebViewer {
    /// 新しいViewerを作成（非同期）
    pub async fn create(canvas: HtmlCanvasElement) -> Result<WebViewer, JsValue> {
        let renderer = Renderer::create(canvas).await?;
        let viewer = Viewer::new(renderer.aspect());
        console_log!("Viewer created ({}x{})", renderer.width(), renderer.height());
        Ok(Self {
            shared: Rc::new(RefCell::new(Session {
                viewer,
                store: SceneConfigStore::new(),
                subscriptions: SubscriptionManager::new(),
                renderer,
                disposed: false,
            })),
        })
    }

    /// シーンを読み込む。Promiseは要求したアセット数で解決する（後続の操作で取り消されたらnull）
    pub fn load_scene(&self, id: String) -> Promise {
        // 呼び出し順で世代を取る（futureの実行はマイクロタスクまで遅れる）
        let load = self.shared.borrow_mut().viewer.begin_config_load();
        future_to_promise(load_and_mount(Rc::clone(&self.shared), id, load))
    }

    /// キャッシュを捨てて取得し直す
    pub fn reload_scene(&self, id: String) -> Promise {
        self.shared.borrow_mut().store.invalidate(&id);
        self.load_scene(id)
    }

    /// 全インスタンスを破棄し、読み込み中のアセットを無効化
    pub fn unmount(&self) {
        self.with(|s| s.viewer.unmount());
    }

    pub fn scene_id(&self) -> Option<String> {
        self.shared
            .borrow()
            .viewer
            .config()
            .map(|config| config.id.clone())
    }

    /// 読み込み済みモジュールのID
    pub fn module_ids(&self) -> Vec<String> {
        self.shared
            .borrow()
            .viewer
            .instance_ids()
            .map(str::to_string)
            .collect()
    }

    // ========================================================================
    // 入力（座標はcanvas上のピクセル）
    // ========================================================================

    pub fn pointer_down(&self, x: f32, y: f32, button: i16) {
        let Some(button) = PointerButton::from_dom(button) else {
            return;
        };
        self.with(|s| {
            let ndc = Self::ndc(s, x, y);
            s.viewer.pointer_down(ndc, button);
        });
    }

    pub fn pointer_move(&self, x: f32, y: f32) {
        self.with(|s| {
            let ndc = Self::ndc(s, x, y);
            s.viewer.pointer_move(ndc);
        });
    }

    pub fn pointer_up(&self, x: f32, y: f32) {
        self.with(|s| {
            let ndc = Self::ndc(s, x, y);
            s.viewer.pointer_up(ndc);
        });
    }

    /// `WheelEvent.deltaY`
    pub fn wheel(&self, delta_y: f32) -> bool {
        self.with(|s| s.viewer.wheel(wheel_notches(delta_y)))
    }

    /// `KeyboardEvent.key`。割り当てがあればtrue
    pub fn key_down(&self, key: &str) -> bool {
        self.with(|s| s.viewer.key_down(key))
    }

    pub fn key_up(&self, key: &str) -> bool {
        self.with(|s| s.viewer.key_up(key))
    }

    // ========================================================================
    // カメラ
    // ========================================================================

    /// "orbit" / "firstPerson" / "fly"
    pub fn set_camera_mode(&self, mode: &str) -> Result<bool, JsValue> {
        let mode = CameraMode::from_name(mode)
            .ok_or_else(|| JsValue::from_str(&format!("unknown camera mode: {mode}")))?;
        Ok(self.with(|s| s.viewer.set_camera_mode(mode)))
    }

    pub fn camera_mode(&self) -> String {
        self.shared.borrow().viewer.camera_mode().as_str().to_string()
    }

    /// Gizmoドラッグ中は無視してfalse
    pub fn reset_camera(&self) -> bool {
        self.with(|s| s.viewer.reset_camera())
    }

    /// { mode, position, target, dragging }
    pub fn camera(&self) -> Result<JsValue, JsValue> {
        let session = self.shared.borrow();
        let rig = session.viewer.rig();
        to_js(&CameraSnapshot {
            mode: rig.mode(),
            position: rig.camera().position,
            target: rig.camera().target,
            dragging: rig.is_suspended(),
        })
    }

    // ========================================================================
    // 選択とGizmo
    // ========================================================================

    /// "translate" / "rotate" / "scale"
    pub fn set_gizmo_mode(&self, mode: &str) -> Result<bool, JsValue> {
        let mode = GizmoMode::from_name(mode)
            .ok_or_else(|| JsValue::from_str(&format!("unknown gizmo mode: {mode}")))?;
        Ok(self.with(|s| s.viewer.set_gizmo_mode(mode)))
    }

    pub fn gizmo_mode(&self) -> String {
        self.shared.borrow().viewer.gizmo_mode().as_str().to_string()
    }

    pub fn reset_selected_transform(&self) -> bool {
        self.with(|s| s.viewer.reset_selected_transform())
    }

    pub fn close_details(&self) -> bool {
        self.with(|s| s.viewer.close_details())
    }

    pub fn select_module(&self, id: &str) -> bool {
        self.with(|s| s.viewer.select_module(id))
    }

    /// 選択中モジュールの詳細、未選択ならnull
    pub fn selection(&self) -> Result<JsValue, JsValue> {
        to_js(&self.shared.borrow().viewer.selection_details())
    }

    // ========================================================================
    // イベント購読
    // ========================================================================

    /// `kinds`を省略すると全イベントを受け取る
    pub fn subscribe(&self, callback: Function, kinds: Option<Vec<String>>) -> u32 {
        let kinds = kinds.map(|k| k.into_iter().collect::<BTreeSet<_>>());
        self.shared
            .borrow_mut()
            .subscriptions
            .subscribe(callback, kinds)
    }

    pub fn unsubscribe(&self, id: u32) -> bool {
        self.shared.borrow_mut().subscriptions.unsubscribe(id)
    }

    // ========================================================================
    // フレーム
    // ========================================================================

    /// フレーム更新（キー移動、描画）
    pub fn tick(&self, _delta_time: f32) -> Result<(), JsValue> {
        let result = {
            let mut session = self.shared.borrow_mut();
            if session.disposed {
                return Ok(());
            }
            let Session {
                viewer, renderer, ..
            } = &mut *session;
            viewer.tick();
            renderer.render(viewer)
        };
        dispatch(&self.shared);
        result
    }

    /// Canvasリサイズ
    pub fn resize(&self, width: u32, height: u32) {
        let mut session = self.shared.borrow_mut();
        session.renderer.resize(width, height);
        let aspect = session.renderer.aspect();
        session.viewer.set_aspect(aspect);
    }

    pub fn width(&self) -> u32 {
        self.shared.borrow().renderer.width()
    }

    pub fn height(&self) -> u32 {
        self.shared.borrow().renderer.height()
    }

    /// シーンを破棄し、購読を全て解除する。以降の読み込み完了は無視される
    pub fn dispose(&self) {
        self.with(|s| {
            s.viewer.unmount();
            s.disposed = true;
        });
        self.shared.borrow_mut().subscriptions.clear();
        console_log!("Viewer disposed");
    }
}
