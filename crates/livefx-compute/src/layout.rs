//! Uniform block layout and packing.
//!
//! Each kernel declares a [`UniformLayout`] table mirroring the `struct
//! Params` of its WGSL source. [`pack`] serializes a resolved
//! [`ParameterSet`] into a byte block that matches that struct exactly:
//! every field is a 4-byte scalar at a declared offset, and the block size is
//! rounded up to [`UNIFORM_ALIGNMENT`] with explicit zero padding.
//!
//! The CPU backend reads its parameters back out of the same block, so both
//! backends see identical values.

use livefx_core::{Error, ParameterSet};

/// Size granularity of uniform buffers.
pub const UNIFORM_ALIGNMENT: usize = 16;

/// How a uniform field is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Real parameter as `f32`.
    F32,
    /// Real parameter divided by 100, as `f32`.
    Percent,
    /// Ordinal of a string parameter within `options`, as `u32`.
    EnumIndex(&'static [&'static str]),
    /// Width of the padded canvas, as `u32`.
    ImageWidth,
    /// Height of the padded canvas, as `u32`.
    ImageHeight,
}

impl FieldKind {
    /// WGSL scalar type of the field.
    pub fn wgsl_type(&self) -> &'static str {
        match self {
            Self::F32 | Self::Percent => "f32",
            Self::EnumIndex(_) | Self::ImageWidth | Self::ImageHeight => "u32",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub offset: u32,
}

/// Field table of one uniform struct.
#[derive(Debug, Clone, Copy)]
pub struct UniformLayout {
    pub name: &'static str,
    pub fields: &'static [UniformField],
}

impl UniformLayout {
    /// Block size in bytes, rounded up to [`UNIFORM_ALIGNMENT`].
    pub fn size(&self) -> usize {
        let end = self
            .fields
            .iter()
            .map(|f| f.offset as usize + 4)
            .max()
            .unwrap_or(0);
        end.div_ceil(UNIFORM_ALIGNMENT).max(1) * UNIFORM_ALIGNMENT
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks that offsets are 4-aligned, increasing and non-overlapping.
    pub fn validate(&self) -> Result<(), String> {
        let mut next = 0u32;
        for f in self.fields {
            if f.offset % 4 != 0 {
                return Err(format!("{}.{}: offset {} not 4-aligned", self.name, f.name, f.offset));
            }
            if f.offset < next {
                return Err(format!("{}.{}: offset {} overlaps previous field", self.name, f.name, f.offset));
            }
            next = f.offset + 4;
        }
        Ok(())
    }
}

/// Packed uniform bytes plus the layout that produced them.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: &'static UniformLayout,
    bytes: Vec<u8>,
}

impl UniformBlock {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn layout(&self) -> &'static UniformLayout {
        self.layout
    }

    /// Reads an `f32` field back out of the block.
    pub fn read_f32(&self, name: &str) -> Option<f32> {
        self.word(name).map(f32::from_le_bytes)
    }

    /// Reads a `u32` field back out of the block.
    pub fn read_u32(&self, name: &str) -> Option<u32> {
        self.word(name).map(u32::from_le_bytes)
    }

    fn word(&self, name: &str) -> Option<[u8; 4]> {
        let at = self.layout.field(name)?.offset as usize;
        self.bytes.get(at..at + 4)?.try_into().ok()
    }
}

/// Serializes `params` into `layout`.
///
/// `extent` is the padded canvas size used by `ImageWidth`/`ImageHeight`
/// fields.
pub fn pack(
    layout: &'static UniformLayout,
    params: &ParameterSet,
    extent: (u32, u32),
) -> Result<UniformBlock, Error> {
    let mut bytes = vec![0u8; layout.size()];
    for f in layout.fields {
        let word = match f.kind {
            FieldKind::F32 => (params.real(f.name)? as f32).to_le_bytes(),
            FieldKind::Percent => ((params.real(f.name)? / 100.0) as f32).to_le_bytes(),
            FieldKind::EnumIndex(options) => {
                let value = params.string(f.name)?;
                let index = options.iter().position(|o| *o == value).ok_or_else(|| {
                    Error::schema(f.name, format!("unknown option '{value}', expected one of {options:?}"))
                })?;
                (index as u32).to_le_bytes()
            }
            FieldKind::ImageWidth => extent.0.to_le_bytes(),
            FieldKind::ImageHeight => extent.1.to_le_bytes(),
        };
        let at = f.offset as usize;
        bytes[at..at + 4].copy_from_slice(&word);
    }
    Ok(UniformBlock { layout, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use livefx_core::{ParamSchema, ParamSpec};
    use serde_json::json;

    static LAYOUT: UniformLayout = UniformLayout {
        name: "test",
        fields: &[
            UniformField { name: "strength", kind: FieldKind::F32, offset: 0 },
            UniformField { name: "opacity", kind: FieldKind::Percent, offset: 4 },
            UniformField { name: "mode", kind: FieldKind::EnumIndex(&["a", "b", "c"]), offset: 8 },
            UniformField { name: "width", kind: FieldKind::ImageWidth, offset: 12 },
            UniformField { name: "height", kind: FieldKind::ImageHeight, offset: 16 },
        ],
    };

    static SCHEMA: ParamSchema = ParamSchema::new(&[
        ("strength", ParamSpec::Real { default: 2.5 }),
        ("opacity", ParamSpec::Real { default: 50.0 }),
        ("mode", ParamSpec::Enum { options: &["a", "b", "c"], default: "c" }),
    ]);

    #[test]
    fn test_size_rounds_to_16() {
        assert_eq!(LAYOUT.size(), 32);
        let one = UniformLayout {
            name: "one",
            fields: &[UniformField { name: "x", kind: FieldKind::F32, offset: 0 }],
        };
        assert_eq!(one.size(), 16);
    }

    #[test]
    fn test_pack_values_and_padding() {
        let params = SCHEMA.defaults();
        let block = pack(&LAYOUT, &params, (640, 480)).unwrap();
        assert_eq!(block.as_bytes().len(), 32);
        assert_eq!(block.read_f32("strength"), Some(2.5));
        assert_eq!(block.read_f32("opacity"), Some(0.5));
        assert_eq!(block.read_u32("mode"), Some(2));
        assert_eq!(block.read_u32("width"), Some(640));
        assert_eq!(block.read_u32("height"), Some(480));
        assert!(block.as_bytes()[20..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_pack_missing_field() {
        let params = ParameterSet::new();
        let err = pack(&LAYOUT, &params, (1, 1)).unwrap_err();
        assert!(matches!(err, Error::SchemaViolation { ref field, .. } if field == "strength"));
    }

    #[test]
    fn test_pack_rejects_unknown_option() {
        let mut params = SCHEMA.resolve(&json!({})).unwrap();
        params.insert("mode", livefx_core::ParamValue::String("z".into()));
        assert!(pack(&LAYOUT, &params, (1, 1)).is_err());
    }

    #[test]
    fn test_validate_overlap() {
        assert!(LAYOUT.validate().is_ok());
        let bad = UniformLayout {
            name: "bad",
            fields: &[
                UniformField { name: "a", kind: FieldKind::F32, offset: 0 },
                UniformField { name: "b", kind: FieldKind::F32, offset: 2 },
            ],
        };
        assert!(bad.validate().is_err());
    }
}
