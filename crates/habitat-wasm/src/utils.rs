//! ユーティリティモジュール
//!
//! console_log マクロ、`log`ファサードのコンソール出力、座標変換

use glam::Vec2;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    pub fn warn(s: &str);
}

/// コンソールにログ出力するマクロ
macro_rules! console_log {
    ($($t:tt)*) => (crate::utils::log(&format_args!($($t)*).to_string()))
}
pub(crate) use console_log;

/// `log`クレートのレコードをブラウザのコンソールへ流す
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        if record.level() <= log::Level::Warn {
            warn(&line);
        } else {
            log(&line);
        }
    }

    fn flush(&self) {}
}

/// 二重登録は無視する
pub fn init_logger(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// ピクセル座標（左上原点）をNDC（中心原点、上が+Y）に変換
pub fn pixel_to_ndc(x: f32, y: f32, width: u32, height: u32) -> Vec2 {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Vec2::new(2.0 * x / w - 1.0, 1.0 - 2.0 * y / h)
}

/// wheelイベントの`deltaY`（ピクセル）をズーム段数に変換
pub fn wheel_notches(delta_y: f32) -> f32 {
    delta_y / 100.0
}
