//! wgpu backend implementation.
//!
//! Each effect id gets its own [`ComputeContext`] (device, queue, compiled
//! pipeline, sampler) built lazily through the [`PipelineCache`]. Building is
//! async and driven with `pollster`; so is the readback map.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use livefx_core::PixelBuffer;
use tracing::{debug, error, trace, warn};
use wgpu::util::DeviceExt;

use super::cache::{CachedContext, PipelineCache, SlotStatus};
use super::{GpuLimits, KernelBackend, PrepareFn, Prepared, Readback};
use crate::config::PowerPreference;
use crate::executor::workgroup_grid;
use crate::kernels::{KernelBinding, KernelSpec};
use crate::{ComputeError, ComputeResult};

// =============================================================================
// ComputeContext
// =============================================================================

/// Device, queue and pipeline for one effect.
pub struct ComputeContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    sampler: Option<wgpu::Sampler>,
    limits: GpuLimits,
    lost: Arc<AtomicBool>,
}

impl CachedContext for ComputeContext {
    fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }
}

fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

fn adapter_options(power: PowerPreference) -> wgpu::RequestAdapterOptions<'static, 'static> {
    wgpu::RequestAdapterOptions {
        power_preference: match power {
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
        },
        compatible_surface: None,
        force_fallback_adapter: false,
    }
}

fn build_failed(effect_id: &str, reason: impl ToString) -> ComputeError {
    ComputeError::PipelineBuildFailed {
        effect: effect_id.to_string(),
        reason: reason.to_string(),
    }
}

impl ComputeContext {
    /// Negotiates a device and compiles `kernel`.
    pub async fn build(effect_id: &str, kernel: &KernelSpec, power: PowerPreference) -> ComputeResult<Self> {
        let instance = create_instance();
        let adapter = instance
            .request_adapter(&adapter_options(power))
            .await
            .ok_or_else(|| build_failed(effect_id, "no suitable GPU adapter found"))?;

        let info = adapter.get_info();
        debug!(effect = effect_id, adapter = %info.name, backend = ?info.backend, "adapter selected");

        let adapter_limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some(kernel.name),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter_limits.clone(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| build_failed(effect_id, format!("device request failed: {e}")))?;

        let lost = Arc::new(AtomicBool::new(false));
        {
            let lost = lost.clone();
            let effect = effect_id.to_string();
            device.set_device_lost_callback(move |reason, message| {
                warn!(effect = %effect, ?reason, %message, "GPU device lost");
                lost.store(true, Ordering::Release);
            });
        }
        {
            let lost = lost.clone();
            let effect = effect_id.to_string();
            device.on_uncaptured_error(Box::new(move |err| match err {
                wgpu::Error::Validation { .. } => {
                    warn!(effect = %effect, "uncaptured wgpu validation error: {err}");
                }
                other => {
                    error!(effect = %effect, "fatal wgpu error: {other}");
                    lost.store(true, Ordering::Release);
                }
            }));
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(kernel.name),
            source: wgpu::ShaderSource::Wgsl(kernel.source.into()),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(kernel.name),
            layout: None, // Auto layout
            module: &module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });
        if let Some(err) = device.pop_error_scope().await {
            return Err(build_failed(effect_id, err));
        }

        let sampler = match kernel.binding {
            KernelBinding::Texture => Some(device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("livefx_sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            })),
            KernelBinding::Buffer => None,
        };

        let limits = GpuLimits {
            max_texture_dim: adapter_limits.max_texture_dimension_2d,
            max_buffer_bytes: adapter_limits.max_buffer_size,
            max_storage_buffer_bytes: adapter_limits.max_storage_buffer_binding_size as u64,
        }
        .with_env_override();
        debug!(effect = effect_id, kernel = kernel.name, max_dim = limits.max_texture_dim, "compute context ready");

        Ok(Self { device, queue, pipeline, sampler, limits, lost })
    }

    pub fn limits(&self) -> &GpuLimits {
        &self.limits
    }

    /// Runs `work` inside an out-of-memory error scope.
    fn allocate<T>(&self, effect_id: &str, work: impl FnOnce() -> T) -> ComputeResult<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let out = work();
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(ComputeError::OutOfDeviceMemory {
                effect: effect_id.to_string(),
                reason: err.to_string(),
            }),
            None => Ok(out),
        }
    }

    fn staging_buffer(&self, size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("livefx_staging"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        })
    }

    fn uniform_buffer(&self, prepared: &Prepared) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("livefx_params"),
            contents: prepared.uniforms.as_bytes(),
            usage: wgpu::BufferUsages::UNIFORM,
        })
    }

    /// Records one dispatch over the whole canvas.
    fn encode_dispatch(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup, grid: (u32, u32)) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("livefx_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(grid.0, grid.1, 1);
    }

    fn run(&self, effect_id: &str, kernel: &KernelSpec, prepared: Prepared) -> ComputeResult<Readback> {
        let (w, h) = (prepared.image.width(), prepared.image.height());
        let grid = workgroup_grid(w, h, kernel.workgroup);
        trace!(effect = effect_id, kernel = kernel.name, w, h, gx = grid.0, gy = grid.1, "wgpu::run");

        let bytes = match kernel.binding {
            KernelBinding::Texture => self.run_texture(effect_id, &prepared, grid)?,
            KernelBinding::Buffer => self.run_buffer(effect_id, &prepared, grid)?,
        };
        let image = PixelBuffer::new(w, h, bytes)?;
        Ok(Readback { image, plan: prepared.plan })
    }

    fn run_texture(&self, effect_id: &str, prepared: &Prepared, grid: (u32, u32)) -> ComputeResult<Vec<u8>> {
        let (w, h) = (prepared.image.width(), prepared.image.height());
        let size = wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 };
        let sampler = self
            .sampler
            .as_ref()
            .ok_or_else(|| build_failed(effect_id, "texture kernel built without a sampler"))?;

        let texture = |label: &'static str, usage: wgpu::TextureUsages| {
            self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage,
                view_formats: &[],
            })
        };
        let (input, output, params, staging) = self.allocate(effect_id, || {
            (
                texture("livefx_input", wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST),
                texture("livefx_output", wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC),
                self.uniform_buffer(prepared),
                self.staging_buffer(GpuLimits::canvas_bytes(w as u64, h as u64)),
            )
        })?;

        let layout = wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(w * 4),
            rows_per_image: Some(h),
        };
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &input,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            prepared.image.data(),
            layout,
            size,
        );

        let input_view = input.create_view(&wgpu::TextureViewDescriptor::default());
        let output_view = output.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group_layout = self.pipeline.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("livefx_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&input_view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&output_view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
                wgpu::BindGroupEntry { binding: 3, resource: params.as_entire_binding() },
            ],
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("livefx_encoder"),
        });
        self.encode_dispatch(&mut encoder, &bind_group, grid);
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &output,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo { buffer: &staging, layout },
            size,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        self.read_back(effect_id, &staging)
    }

    fn run_buffer(&self, effect_id: &str, prepared: &Prepared, grid: (u32, u32)) -> ComputeResult<Vec<u8>> {
        let (w, h) = (prepared.image.width(), prepared.image.height());
        let size = GpuLimits::canvas_bytes(w as u64, h as u64);
        let weights = prepared.weights.as_deref().unwrap_or(&[1.0]);

        let (src, dst, params, weight_buf, staging) = self.allocate(effect_id, || {
            (
                self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("livefx_src"),
                    contents: prepared.image.data(),
                    usage: wgpu::BufferUsages::STORAGE,
                }),
                self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("livefx_dst"),
                    size,
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                    mapped_at_creation: false,
                }),
                self.uniform_buffer(prepared),
                self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("livefx_weights"),
                    contents: bytemuck::cast_slice(weights),
                    usage: wgpu::BufferUsages::STORAGE,
                }),
                self.staging_buffer(size),
            )
        })?;

        let bind_group_layout = self.pipeline.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("livefx_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: src.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: dst.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: params.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: weight_buf.as_entire_binding() },
            ],
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("livefx_encoder"),
        });
        self.encode_dispatch(&mut encoder, &bind_group, grid);
        encoder.copy_buffer_to_buffer(&dst, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        self.read_back(effect_id, &staging)
    }

    /// Maps the staging buffer and copies it out before unmapping.
    fn read_back(&self, effect_id: &str, staging: &wgpu::Buffer) -> ComputeResult<Vec<u8>> {
        let lost = || ComputeError::DeviceLost { effect: effect_id.to_string() };

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        self.device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(effect = effect_id, error = %e, "staging map failed");
                return Err(lost());
            }
            Err(_) => {
                warn!(effect = effect_id, "staging map callback dropped");
                return Err(lost());
            }
        }

        let data = slice.get_mapped_range();
        let bytes = data.to_vec();
        drop(data);
        staging.unmap();

        if self.is_lost() {
            return Err(lost());
        }
        Ok(bytes)
    }
}

// =============================================================================
// WgpuBackend
// =============================================================================

/// GPU backend with one cached context per effect id.
pub struct WgpuBackend {
    cache: PipelineCache<ComputeContext>,
    power: PowerPreference,
}

impl WgpuBackend {
    pub fn new(power: PowerPreference) -> Self {
        Self { cache: PipelineCache::new(), power }
    }

    /// Check if wgpu is available.
    pub fn is_available() -> bool {
        pollster::block_on(async {
            create_instance()
                .request_adapter(&adapter_options(PowerPreference::default()))
                .await
                .is_some()
        })
    }

    /// Cache state for `effect_id`.
    pub fn status(&self, effect_id: &str) -> SlotStatus {
        self.cache.status(effect_id)
    }
}

impl KernelBackend for WgpuBackend {
    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn dispatch(
        &self,
        effect_id: &str,
        kernel: &'static KernelSpec,
        prepare: &mut PrepareFn<'_>,
    ) -> ComputeResult<Readback> {
        let power = self.power;
        self.cache.with_context(
            effect_id,
            || pollster::block_on(ComputeContext::build(effect_id, kernel, power)),
            |ctx| {
                let prepared = prepare(ctx.limits())?;
                ctx.run(effect_id, kernel, prepared)
            },
        )
    }

    fn invalidate(&self, effect_id: &str) {
        self.cache.invalidate(effect_id);
    }

    /// The built context's limits, or the defaults before the first dispatch.
    fn device_limits(&self, effect_id: &str) -> GpuLimits {
        self.cache
            .peek(effect_id)
            .map_or_else(GpuLimits::from_env, |ctx| ctx.limits().clone())
    }
}
