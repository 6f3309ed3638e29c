//! Gizmo描画パイプラインモジュール
//!
//! 選択中モジュールのハンドルを深度テストなしで最前面に重ねる

use glam::Mat4;
use wgpu::util::DeviceExt;

use super::gpu_context::GpuContext;
use super::layout::{PipelineParts, uniform_buffer, uniform_entry, wgsl};
use crate::shaders;

use habitat_view::{Camera, GizmoState, GizmoVertex, build_gizmo_vertices};

/// ローカル座標からクリップ座標への行列（カメラ距離スケール込み）
pub fn clip_from_local(state: &GizmoState, camera: &Camera) -> Mat4 {
    camera.build_view_projection_matrix() * state.model_matrix(camera.position)
}

pub struct GizmoPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// 前フレームの頂点バッファ。足りなくなったら作り直す
    vertices: Option<(wgpu::Buffer, usize)>,
}

impl GizmoPipeline {
    pub fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;
        let uniform = uniform_buffer(device, "Gizmo Uniform", &Mat4::IDENTITY.to_cols_array());

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gizmo Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX, false)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Gizmo Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });

        let shader = wgsl(device, "Gizmo Shader", shaders::GIZMO_SHADER);
        let pipeline = PipelineParts {
            label: "Gizmo Pipeline",
            shader: &shader,
            bind_group_layouts: &[&layout],
            vertex: GizmoVertex::desc(),
            format: ctx.config.format,
            blend: wgpu::BlendState::ALPHA_BLENDING,
            // リングや平面ハンドルは裏からも見える
            cull_mode: None,
            depth_stencil: None,
        }
        .build(device);

        Self {
            pipeline,
            uniform,
            bind_group,
            vertices: None,
        }
    }

    fn upload(&mut self, ctx: &GpuContext, vertices: &[GizmoVertex]) {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        match &self.vertices {
            Some((buffer, capacity)) if *capacity >= bytes.len() => {
                ctx.queue.write_buffer(buffer, 0, bytes);
            }
            _ => {
                let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Gizmo Vertices"),
                    contents: bytes,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                self.vertices = Some((buffer, bytes.len()));
            }
        }
    }

    /// 既存の描画の上にGizmoを重ねるパスを記録。非表示なら何もしない
    pub fn encode(
        &mut self,
        ctx: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        state: &GizmoState,
        camera: &Camera,
    ) {
        if !state.visible {
            return;
        }
        let vertices = build_gizmo_vertices(state);
        if vertices.is_empty() {
            return;
        }

        ctx.queue.write_buffer(
            &self.uniform,
            0,
            bytemuck::bytes_of(&clip_from_local(state, camera).to_cols_array()),
        );
        let byte_len = (vertices.len() * std::mem::size_of::<GizmoVertex>()) as u64;
        self.upload(ctx, &vertices);
        let Some((buffer, _)) = &self.vertices else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Gizmo Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, buffer.slice(..byte_len));
        pass.draw(0..vertices.len() as u32, 0..1);
    }
}
