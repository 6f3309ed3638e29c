//! シーン描画パイプラインモジュール
//!
//! モジュールのプロキシボックスと床をアンビエント + 平行光源で描画する

use glam::{Vec3, Vec4};
use wgpu::util::DeviceExt;

use super::depth::DEPTH_FORMAT;
use super::gpu_context::GpuContext;
use super::layout::{PipelineParts, uniform_buffer, uniform_entry, wgsl};
use crate::shaders;

use habitat_core::scene::{parse_hex_color, Lighting};
use habitat_core::ModelUniform;
use habitat_view::{CameraUniform, Mesh, Vertex};

/// ライトUniform（色は強度を乗算済み）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 4],
    pub direction: [f32; 4],
    pub color: [f32; 4],
}

impl LightUniform {
    pub fn from_lighting(lighting: &Lighting) -> Self {
        let rgb = |hex: &str, intensity: f32| {
            let color = parse_hex_color(hex).unwrap_or(Vec4::ONE);
            (color.truncate() * intensity).extend(1.0).to_array()
        };
        let direction = lighting
            .directional
            .position
            .try_normalize()
            .unwrap_or(Vec3::Y);
        Self {
            ambient: rgb(&lighting.ambient.color, lighting.ambient.intensity),
            direction: direction.extend(0.0).to_array(),
            color: rgb(&lighting.directional.color, lighting.directional.intensity),
        }
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::from_lighting(&Lighting::default())
    }
}

/// 頂点・インデックスバッファの組
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.index_count() as u32,
        }
    }
}

/// シーン描画パイプライン
/// ModelUniformは1本のバッファに動的オフセットで並べる
pub struct ScenePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub camera_buffer: wgpu::Buffer,
    pub light_buffer: wgpu::Buffer,
    pub frame_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    pub model_buffer: wgpu::Buffer,
    pub model_bind_group: wgpu::BindGroup,
    /// 1スロットのバイト幅
    pub model_stride: u64,
    /// 確保済みスロット数
    model_capacity: usize,
    pub cube: GpuMesh,
    pub ground: GpuMesh,
}

const MODEL_SIZE: u64 = std::mem::size_of::<ModelUniform>() as u64;
const INITIAL_SLOTS: usize = 64;
/// 床の一辺
pub const GROUND_SIZE: f32 = 200.0;

impl ScenePipeline {
    pub fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;

        let camera_buffer = uniform_buffer(device, "Camera Buffer", &CameraUniform::default());
        let light_buffer = uniform_buffer(device, "Light Buffer", &LightUniform::default());

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT, false),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT, false),
            ],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT, true)],
        });
        let model_stride = MODEL_SIZE.next_multiple_of(ctx.uniform_alignment());
        let (model_buffer, model_bind_group) =
            Self::create_model_slots(device, &model_layout, model_stride, INITIAL_SLOTS);

        let shader = wgsl(device, "Scene Shader", shaders::MAIN_SHADER);
        let pipeline = PipelineParts {
            label: "Scene Pipeline",
            shader: &shader,
            bind_group_layouts: &[&frame_layout, &model_layout],
            vertex: Vertex::desc(),
            format: ctx.config.format,
            blend: wgpu::BlendState::REPLACE,
            cull_mode: Some(wgpu::Face::Back),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
        }
        .build(device);

        Self {
            pipeline,
            camera_buffer,
            light_buffer,
            frame_bind_group,
            model_layout,
            model_buffer,
            model_bind_group,
            model_stride,
            model_capacity: INITIAL_SLOTS,
            cube: GpuMesh::upload(device, &Mesh::cube(), "Cube"),
            ground: GpuMesh::upload(device, &Mesh::ground(GROUND_SIZE), "Ground"),
        }
    }

    fn create_model_slots(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        slots: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Buffer"),
            size: stride * slots as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MODEL_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// 全スロットを書き込む。足りなければ倍々で確保し直す
    pub fn write_models(&mut self, ctx: &GpuContext, models: &[ModelUniform]) {
        if models.len() > self.model_capacity {
            let mut slots = self.model_capacity.max(1);
            while slots < models.len() {
                slots *= 2;
            }
            let (buffer, bind_group) =
                Self::create_model_slots(&ctx.device, &self.model_layout, self.model_stride, slots);
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
            self.model_capacity = slots;
            log::debug!("model buffer grown to {slots} slots");
        }

        let stride = self.model_stride as usize;
        let mut bytes = vec![0u8; stride * models.len()];
        for (slot, model) in bytes.chunks_mut(stride).zip(models) {
            slot[..MODEL_SIZE as usize].copy_from_slice(bytemuck::bytes_of(model));
        }
        ctx.queue.write_buffer(&self.model_buffer, 0, &bytes);
    }

    /// `slot`番目のModelUniformを指す動的オフセット
    pub fn model_offset(&self, slot: usize) -> u32 {
        (self.model_stride * slot as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitat_core::scene::{AmbientLight, DirectionalLight};

    #[test]
    fn test_light_uniform_size() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
    }

    #[test]
    fn test_light_from_lighting() {
        let lighting = Lighting {
            ambient: AmbientLight {
                color: "#ff0000".into(),
                intensity: 0.5,
                name: None,
            },
            directional: DirectionalLight {
                color: "#ffffff".into(),
                intensity: 2.0,
                position: Vec3::new(0.0, 10.0, 0.0),
                cast_shadow: true,
                name: Some("Sun".into()),
            },
        };
        let light = LightUniform::from_lighting(&lighting);
        assert_eq!(light.ambient, [0.5, 0.0, 0.0, 1.0]);
        assert_eq!(light.direction, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(light.color, [2.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn test_unparseable_color_falls_back_to_white() {
        let mut lighting = Lighting::default();
        lighting.ambient.color = "skyblue".into();
        lighting.ambient.intensity = 1.0;
        assert_eq!(LightUniform::from_lighting(&lighting).ambient, [1.0, 1.0, 1.0, 1.0]);
    }
}
