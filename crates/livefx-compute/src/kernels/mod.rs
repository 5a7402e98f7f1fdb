//! Kernel table and CPU reference kernels.
//!
//! A [`KernelSpec`] bundles everything a backend needs to run one effect
//! kernel: the WGSL source, how its resources are bound, its workgroup size
//! and the uniform layout shared with the packer.

mod chromatic;
mod directional;
mod gaussian;
pub(crate) mod sampler;

pub use gaussian::{gaussian_weight_count, gaussian_weights, kernel_radius};

pub(crate) use chromatic::run as chromatic_aberration_cpu;
pub(crate) use directional::run as directional_blur_cpu;
pub(crate) use gaussian::run as gaussian_blur_cpu;

use livefx_core::geometry::TEXTURE_ROW_GRANULARITY;

use crate::layout::{FieldKind, UniformBlock, UniformField, UniformLayout};
use crate::shaders;
use crate::{ComputeError, ComputeResult};

/// Which kernel a spec describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    GaussianBlur,
    DirectionalBlur,
    ChromaticAberration,
}

/// How a kernel reads and writes pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelBinding {
    /// Sampled texture in, rgba8unorm storage texture out.
    Texture,
    /// Packed RGBA8 storage buffers plus a weight field.
    Buffer,
}

#[derive(Debug)]
pub struct KernelSpec {
    pub name: &'static str,
    pub kind: KernelKind,
    pub binding: KernelBinding,
    /// Workgroup size `(x, y)` declared in the shader.
    pub workgroup: (u32, u32),
    pub layout: &'static UniformLayout,
    pub source: &'static str,
}

impl KernelSpec {
    /// Alignment granularity in pixels for this kernel's readback path.
    pub fn granularity(&self) -> u32 {
        match self.binding {
            KernelBinding::Texture => TEXTURE_ROW_GRANULARITY,
            KernelBinding::Buffer => 1,
        }
    }
}

pub const BLUR_MODES: &[&str] = &["both", "behind", "front"];
pub const COLOR_MODES: &[&str] = &["rgb", "cmyk"];
pub const BLEND_MODES: &[&str] = &["over", "under"];

pub static GAUSSIAN_BLUR_LAYOUT: UniformLayout = UniformLayout {
    name: "gaussian_blur",
    fields: &[
        UniformField { name: "width", kind: FieldKind::ImageWidth, offset: 0 },
        UniformField { name: "height", kind: FieldKind::ImageHeight, offset: 4 },
        UniformField { name: "radius", kind: FieldKind::F32, offset: 8 },
    ],
};

pub static DIRECTIONAL_BLUR_LAYOUT: UniformLayout = UniformLayout {
    name: "directional_blur",
    fields: &[
        UniformField { name: "strength", kind: FieldKind::F32, offset: 0 },
        UniformField { name: "angle", kind: FieldKind::F32, offset: 4 },
        UniformField { name: "opacity", kind: FieldKind::Percent, offset: 8 },
        UniformField { name: "blurMode", kind: FieldKind::EnumIndex(BLUR_MODES), offset: 12 },
        UniformField { name: "fadeOut", kind: FieldKind::F32, offset: 16 },
        UniformField { name: "fadeDirection", kind: FieldKind::F32, offset: 20 },
        UniformField { name: "contentWidth", kind: FieldKind::ImageWidth, offset: 24 },
        UniformField { name: "contentHeight", kind: FieldKind::ImageHeight, offset: 28 },
    ],
};

pub static CHROMATIC_ABERRATION_LAYOUT: UniformLayout = UniformLayout {
    name: "chromatic_aberration",
    fields: &[
        UniformField { name: "strength", kind: FieldKind::F32, offset: 0 },
        UniformField { name: "angle", kind: FieldKind::F32, offset: 4 },
        UniformField { name: "colorMode", kind: FieldKind::EnumIndex(COLOR_MODES), offset: 8 },
        UniformField { name: "opacity", kind: FieldKind::Percent, offset: 12 },
        UniformField { name: "blendMode", kind: FieldKind::EnumIndex(BLEND_MODES), offset: 16 },
    ],
};

pub static GAUSSIAN_BLUR: KernelSpec = KernelSpec {
    name: "gaussian_blur",
    kind: KernelKind::GaussianBlur,
    binding: KernelBinding::Buffer,
    workgroup: (8, 8),
    layout: &GAUSSIAN_BLUR_LAYOUT,
    source: shaders::GAUSSIAN_BLUR,
};

pub static DIRECTIONAL_BLUR: KernelSpec = KernelSpec {
    name: "directional_blur",
    kind: KernelKind::DirectionalBlur,
    binding: KernelBinding::Texture,
    workgroup: (16, 16),
    layout: &DIRECTIONAL_BLUR_LAYOUT,
    source: shaders::DIRECTIONAL_BLUR,
};

pub static CHROMATIC_ABERRATION: KernelSpec = KernelSpec {
    name: "chromatic_aberration",
    kind: KernelKind::ChromaticAberration,
    binding: KernelBinding::Texture,
    workgroup: (16, 16),
    layout: &CHROMATIC_ABERRATION_LAYOUT,
    source: shaders::CHROMATIC_ABERRATION,
};

/// All kernels, for tests and diagnostics.
pub static ALL: [&KernelSpec; 3] = [&GAUSSIAN_BLUR, &DIRECTIONAL_BLUR, &CHROMATIC_ABERRATION];

pub(crate) fn uniform_f32(block: &UniformBlock, name: &str) -> ComputeResult<f32> {
    block.read_f32(name).ok_or_else(|| missing_uniform(block, name))
}

pub(crate) fn uniform_u32(block: &UniformBlock, name: &str) -> ComputeResult<u32> {
    block.read_u32(name).ok_or_else(|| missing_uniform(block, name))
}

fn missing_uniform(block: &UniformBlock, name: &str) -> ComputeError {
    livefx_core::Error::schema(name, format!("not in uniform layout '{}'", block.layout().name)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `(name, type)` pairs of the `struct Params` block in a WGSL source.
    fn wgsl_params(source: &str) -> Vec<(String, String)> {
        let start = source.find("struct Params {").expect("no Params struct");
        let body = &source[start + "struct Params {".len()..];
        let end = body.find('}').expect("unterminated Params struct");
        body[..end]
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| {
                let l = l.trim_end_matches(',');
                let (name, ty) = l.split_once(':').expect("field without type");
                (name.trim().to_string(), ty.trim().to_string())
            })
            .collect()
    }

    #[test]
    fn test_layouts_match_wgsl() {
        for spec in ALL {
            let wgsl = wgsl_params(spec.source);
            let layout = spec.layout;
            assert_eq!(wgsl.len(), layout.fields.len(), "{}: field count", spec.name);
            for (i, (field, (name, ty))) in layout.fields.iter().zip(&wgsl).enumerate() {
                assert_eq!(field.name, name.as_str(), "{}: field {i} name", spec.name);
                assert_eq!(field.kind.wgsl_type(), ty.as_str(), "{}: {name} type", spec.name);
                // all fields are 4-byte scalars, so WGSL offsets are 4 * index
                assert_eq!(field.offset as usize, i * 4, "{}: {name} offset", spec.name);
            }
            assert!(layout.validate().is_ok());
            assert_eq!(layout.size() % 16, 0);
        }
    }

    #[test]
    fn test_workgroup_sizes_match_wgsl() {
        for spec in ALL {
            let decl = format!("@workgroup_size({}, {})", spec.workgroup.0, spec.workgroup.1);
            assert!(spec.source.contains(&decl), "{}: missing {decl}", spec.name);
        }
    }

    #[test]
    fn test_granularity() {
        assert_eq!(DIRECTIONAL_BLUR.granularity(), 64);
        assert_eq!(CHROMATIC_ABERRATION.granularity(), 64);
        assert_eq!(GAUSSIAN_BLUR.granularity(), 1);
    }

    #[test]
    fn test_layout_sizes() {
        assert_eq!(GAUSSIAN_BLUR_LAYOUT.size(), 16);
        assert_eq!(DIRECTIONAL_BLUR_LAYOUT.size(), 32);
        assert_eq!(CHROMATIC_ABERRATION_LAYOUT.size(), 32);
    }
}
