//! シェーダーモジュール
//!
//! WGSLシェーダーを外部ファイルから読み込む

/// プロキシ描画用（アンビエント + 平行光源）
pub const MAIN_SHADER: &str = include_str!("main.wgsl");

/// Gizmoシェーダー（Gizmo描画用）
pub const GIZMO_SHADER: &str = include_str!("gizmo.wgsl");
