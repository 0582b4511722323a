use std::fmt;

/// Handle to a GPU buffer created through a [`GraphicsDevice`](super::GraphicsDevice).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BufferId(pub u32);

/// Handle to one compiled shader stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct StageId(pub u32);

/// Handle to a linked shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ProgramId(pub u32);

/// Vertex shader input slot (`@location(n)`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct AttributeLocation(pub u32);

/// Uniform variable slot (`@group(g) @binding(b)`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    /// Per-vertex attribute data.
    Vertex,
    /// 16-bit element indices.
    Index,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// How an index sequence is grouped into primitives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveTopology {
    /// Every two consecutive indices form one independent segment.
    LineList,
    /// Every three consecutive indices form one triangle.
    TriangleList,
}

impl PrimitiveTopology {
    /// Number of indices consumed per primitive.
    #[inline]
    pub const fn arity(self) -> usize {
        match self {
            Self::LineList => 2,
            Self::TriangleList => 3,
        }
    }
}

impl fmt::Display for PrimitiveTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LineList => "line-list",
            Self::TriangleList => "triangle-list",
        })
    }
}

impl From<PrimitiveTopology> for wgpu::PrimitiveTopology {
    fn from(t: PrimitiveTopology) -> Self {
        match t {
            PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
            PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

/// Depth comparison; a fragment passes when `fragment_depth <op> stored_depth`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DepthFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl From<DepthFunc> for wgpu::CompareFunction {
    fn from(f: DepthFunc) -> Self {
        match f {
            DepthFunc::Never => wgpu::CompareFunction::Never,
            DepthFunc::Less => wgpu::CompareFunction::Less,
            DepthFunc::Equal => wgpu::CompareFunction::Equal,
            DepthFunc::LessEqual => wgpu::CompareFunction::LessEqual,
            DepthFunc::Greater => wgpu::CompareFunction::Greater,
            DepthFunc::NotEqual => wgpu::CompareFunction::NotEqual,
            DepthFunc::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            DepthFunc::Always => wgpu::CompareFunction::Always,
        }
    }
}

/// How float components are pulled out of a vertex buffer for one attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttributeLayout {
    /// Components per vertex (1..=4).
    pub components: u8,
    pub normalized: bool,
    /// Bytes between consecutive vertices; 0 means tightly packed.
    pub stride: u32,
    /// Byte offset of the first component.
    pub offset: u32,
}

impl VertexAttributeLayout {
    /// Tightly packed, non-normalized `f32` components starting at offset 0.
    #[inline]
    pub const fn packed_f32(components: u8) -> Self {
        Self {
            components,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    #[inline]
    pub fn effective_stride(self) -> u32 {
        if self.stride == 0 {
            self.components as u32 * std::mem::size_of::<f32>() as u32
        } else {
            self.stride
        }
    }
}

/// Whether a graphics context exists.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeviceStatus {
    Ready,
    /// No context could be created, or it was lost.
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_stride_derives_from_components() {
        assert_eq!(VertexAttributeLayout::packed_f32(3).effective_stride(), 12);
        assert_eq!(VertexAttributeLayout::packed_f32(4).effective_stride(), 16);
    }

    #[test]
    fn explicit_stride_is_kept() {
        let layout = VertexAttributeLayout {
            stride: 28,
            ..VertexAttributeLayout::packed_f32(3)
        };
        assert_eq!(layout.effective_stride(), 28);
    }

    #[test]
    fn topology_arity() {
        assert_eq!(PrimitiveTopology::LineList.arity(), 2);
        assert_eq!(PrimitiveTopology::TriangleList.arity(), 3);
    }
}
