//! GPUコンテキストモジュール
//!
//! WebGPUのDevice, Queue, Surfaceを管理

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

/// GPUコンテキスト
/// WebGPUの基本リソースを保持
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: (u32, u32),
}

/// ブラウザ推奨のbgra8unormがあればそれ、なければ先頭
fn preferred_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    caps.formats
        .iter()
        .copied()
        .find(|f| *f == wgpu::TextureFormat::Bgra8Unorm)
        .or_else(|| caps.formats.first().copied())
}

/// キャンバスは不透明で合成する
fn preferred_alpha_mode(caps: &wgpu::SurfaceCapabilities) -> wgpu::CompositeAlphaMode {
    if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
        wgpu::CompositeAlphaMode::Opaque
    } else {
        caps.alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto)
    }
}

fn js_error(context: &str, error: impl std::fmt::Debug) -> JsValue {
    JsValue::from_str(&format!("{context}: {error:?}"))
}

impl GpuContext {
    /// 新しいGPUコンテキストを作成（非同期）
    /// WebGPUが使えないブラウザではWebGL2にフォールバックする
    pub async fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let width = canvas.width();
        let height = canvas.height();
        log::info!("initializing GPU for {width}x{height} canvas");

        if width == 0 || height == 0 {
            return Err(JsValue::from_str(&format!(
                "Canvas size is invalid: {width}x{height}. Set canvas.width/height before initializing."
            )));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        #[cfg(target_arch = "wasm32")]
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| js_error("Failed to create surface", e))?;

        #[cfg(not(target_arch = "wasm32"))]
        let surface: wgpu::Surface<'static> = {
            let _ = (&instance, &canvas);
            return Err(JsValue::from_str("canvas surfaces require wasm32"));
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| js_error("Failed to find suitable adapter", e))?;

        log::info!("adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Habitat Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| js_error("Failed to create device", e))?;

        let caps = surface.get_capabilities(&adapter);
        let format = preferred_format(&caps)
            .ok_or_else(|| JsValue::from_str("Surface reports no texture formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: preferred_alpha_mode(&caps),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size: (width, height),
        })
    }

    /// リサイズ（0サイズは無視）
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    pub fn aspect(&self) -> f32 {
        self.size.0 as f32 / self.size.1.max(1) as f32
    }

    /// Uniformバッファの動的オフセット境界
    pub fn uniform_alignment(&self) -> u64 {
        u64::from(self.device.limits().min_uniform_buffer_offset_alignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, SurfaceCapabilities, TextureFormat};

    #[test]
    fn test_prefers_bgra8() {
        let caps = SurfaceCapabilities {
            formats: vec![TextureFormat::Rgba8Unorm, TextureFormat::Bgra8Unorm],
            ..Default::default()
        };
        assert_eq!(preferred_format(&caps), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn test_falls_back_to_first_format() {
        let caps = SurfaceCapabilities {
            formats: vec![TextureFormat::Rgba8UnormSrgb],
            ..Default::default()
        };
        assert_eq!(preferred_format(&caps), Some(TextureFormat::Rgba8UnormSrgb));
        let empty = SurfaceCapabilities {
            formats: Vec::new(),
            ..Default::default()
        };
        assert_eq!(preferred_format(&empty), None);
    }

    #[test]
    fn test_alpha_mode() {
        let caps = SurfaceCapabilities {
            alpha_modes: vec![CompositeAlphaMode::PreMultiplied, CompositeAlphaMode::Opaque],
            ..Default::default()
        };
        assert_eq!(preferred_alpha_mode(&caps), CompositeAlphaMode::Opaque);
        let none = SurfaceCapabilities {
            alpha_modes: Vec::new(),
            ..Default::default()
        };
        assert_eq!(preferred_alpha_mode(&none), CompositeAlphaMode::Auto);
    }
}
