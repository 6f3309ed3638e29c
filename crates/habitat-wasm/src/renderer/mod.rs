//! Rendererモジュール
//!
//! モジュールをバウンディングボックスのプロキシとして描画し、Gizmoを重ねる

mod depth;
mod gizmo_pipeline;
mod gpu_context;
mod layout;
mod scene_pipeline;

pub use gpu_context::GpuContext;
pub use scene_pipeline::LightUniform;

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use habitat_core::scene::{parse_hex_color, SceneConfig};
use habitat_core::ModelUniform;
use habitat_view::glam::{Mat4, Vec4};
use habitat_view::Viewer;

use gizmo_pipeline::GizmoPipeline;
use scene_pipeline::ScenePipeline;

const DEFAULT_SKY: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.07,
    b: 0.12,
    a: 1.0,
};
const DEFAULT_GROUND: [f32; 4] = [0.25, 0.25, 0.28, 1.0];

fn clear_color(config: Option<&SceneConfig>) -> wgpu::Color {
    config
        .and_then(|c| c.environment.as_ref())
        .and_then(|env| env.sky_color.as_deref())
        .and_then(parse_hex_color)
        .map_or(DEFAULT_SKY, |c| wgpu::Color {
            r: f64::from(c.x),
            g: f64::from(c.y),
            b: f64::from(c.z),
            a: 1.0,
        })
}

fn ground_color(config: Option<&SceneConfig>) -> [f32; 4] {
    config
        .and_then(|c| c.environment.as_ref())
        .and_then(|env| env.ground_color.as_deref())
        .and_then(parse_hex_color)
        .map_or(DEFAULT_GROUND, |c: Vec4| c.to_array())
}

/// Renderer構造体
pub struct Renderer {
    ctx: GpuContext,
    scene: ScenePipeline,
    gizmo: GizmoPipeline,
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl Renderer {
    /// 新しいRendererを作成（非同期）
    pub async fn create(canvas: HtmlCanvasElement) -> Result<Renderer, JsValue> {
        let ctx = GpuContext::new(canvas).await?;
        let scene = ScenePipeline::new(&ctx);
        let gizmo = GizmoPipeline::new(&ctx);
        let (depth_texture, depth_view) =
            depth::create_texture(&ctx.device, ctx.width(), ctx.height());
        log::info!("renderer ready");
        Ok(Self {
            ctx,
            scene,
            gizmo,
            depth_texture,
            depth_view,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.ctx.resize(width, height);
        let (depth_texture, depth_view) = depth::create_texture(&self.ctx.device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
        log::debug!("resized to {width}x{height}");
    }

    pub fn width(&self) -> u32 {
        self.ctx.width()
    }

    pub fn height(&self) -> u32 {
        self.ctx.height()
    }

    pub fn aspect(&self) -> f32 {
        self.ctx.aspect()
    }

    /// 床、全モジュールのプロキシ、Gizmoの順に1フレーム描画
    pub fn render(&mut self, viewer: &Viewer) -> Result<(), JsValue> {
        let config = viewer.config().map(|c| c.as_ref());
        let camera = viewer.rig().camera();

        let lights = config
            .map(|c| LightUniform::from_lighting(&c.lighting))
            .unwrap_or_default();
        self.ctx
            .queue
            .write_buffer(&self.scene.camera_buffer, 0, bytemuck::bytes_of(&camera.uniform()));
        self.ctx
            .queue
            .write_buffer(&self.scene.light_buffer, 0, bytemuck::bytes_of(&lights));

        // slot 0 は床
        let draws = viewer.draw_list();
        let models: Vec<ModelUniform> = std::iter::once(ModelUniform::new(
            Mat4::IDENTITY,
            ground_color(config),
        ))
        .chain(draws.iter().map(|d| ModelUniform::new(d.model, d.color)))
        .collect();
        self.scene.write_models(&self.ctx, &models);

        let output = self
            .ctx
            .surface
            .get_current_texture()
            .map_err(|e| JsValue::from_str(&format!("Failed to get surface texture: {e:?}")))?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(config)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_pipeline(&self.scene.pipeline);
            pass.set_bind_group(0, &self.scene.frame_bind_group, &[]);

            let ground = &self.scene.ground;
            pass.set_bind_group(1, &self.scene.model_bind_group, &[self.scene.model_offset(0)]);
            pass.set_vertex_buffer(0, ground.vertex_buffer.slice(..));
            pass.set_index_buffer(ground.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..ground.num_indices, 0, 0..1);

            let cube = &self.scene.cube;
            pass.set_vertex_buffer(0, cube.vertex_buffer.slice(..));
            pass.set_index_buffer(cube.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            for slot in 1..models.len() {
                pass.set_bind_group(
                    1,
                    &self.scene.model_bind_group,
                    &[self.scene.model_offset(slot)],
                );
                pass.draw_indexed(0..cube.num_indices, 0, 0..1);
            }
        }

        self.gizmo.encode(
            &self.ctx,
            &mut encoder,
            &view,
            viewer.selection().gizmo().state(),
            camera,
        );

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
