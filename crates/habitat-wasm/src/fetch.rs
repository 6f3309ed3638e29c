//! HTTP取得モジュール
//!
//! `window.fetch` でシーン設定とモデルアセットを取得する

use js_sys::{ArrayBuffer, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use habitat_core::assets::{parse_asset, AssetGeometry, AssetLoadError};
use habitat_core::scene::ConfigLoadError;

/// シーン設定の配信パス
pub fn config_url(id: &str) -> String {
    format!("/configs/{id}.json")
}

/// 取得失敗の分類
#[derive(Debug)]
pub enum FetchFailure {
    NotFound,
    Other(String),
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

async fn fetch_response(url: &str) -> Result<Response, FetchFailure> {
    let window = web_sys::window().ok_or_else(|| FetchFailure::Other("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| FetchFailure::Other(describe(&e)))?;
    let response: Response = response
        .dyn_into()
        .map_err(|e| FetchFailure::Other(describe(&e)))?;
    match response.status() {
        404 => Err(FetchFailure::NotFound),
        _ if !response.ok() => Err(FetchFailure::Other(format!(
            "HTTP {} {}",
            response.status(),
            response.status_text()
        ))),
        _ => Ok(response),
    }
}

/// テキストとして取得
pub async fn fetch_text(url: &str) -> Result<String, FetchFailure> {
    let response = fetch_response(url).await?;
    let promise = response
        .text()
        .map_err(|e| FetchFailure::Other(describe(&e)))?;
    let text = JsFuture::from(promise)
        .await
        .map_err(|e| FetchFailure::Other(describe(&e)))?;
    text.as_string()
        .ok_or_else(|| FetchFailure::Other("response body is not text".into()))
}

/// バイト列として取得
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchFailure> {
    let response = fetch_response(url).await?;
    let promise = response
        .array_buffer()
        .map_err(|e| FetchFailure::Other(describe(&e)))?;
    let buffer = JsFuture::from(promise)
        .await
        .map_err(|e| FetchFailure::Other(describe(&e)))?;
    let buffer: ArrayBuffer = buffer
        .dyn_into()
        .map_err(|e| FetchFailure::Other(describe(&e)))?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// シーン設定文書を取得
pub async fn fetch_config(id: &str) -> Result<String, ConfigLoadError> {
    fetch_text(&config_url(id)).await.map_err(|failure| match failure {
        FetchFailure::NotFound => ConfigLoadError::NotFound(id.to_string()),
        FetchFailure::Other(reason) => ConfigLoadError::Fetch {
            id: id.to_string(),
            reason,
        },
    })
}

/// モデルを取得してピック用ジオメトリに変換
pub async fn fetch_asset(path: &str) -> Result<AssetGeometry, AssetLoadError> {
    let bytes = fetch_bytes(path).await.map_err(|failure| match failure {
        FetchFailure::NotFound => AssetLoadError::NotFound(path.to_string()),
        FetchFailure::Other(reason) => AssetLoadError::Fetch {
            path: path.to_string(),
            reason,
        },
    })?;
    parse_asset(path, &bytes)
}
