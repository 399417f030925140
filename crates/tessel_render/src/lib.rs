//! Tessel Render System
//!
//! Quad batching on top of a narrow graphics backend interface

pub mod backend;
pub mod batch;
pub mod batch_manager;
pub mod vertex;
pub mod window;

pub use backend::{
    probe_capabilities, BackendError, DrawCall, DrawMode, GraphicsBackend, HeadlessBackend,
    RecordedDraw, ShaderHandle, TextureHandle,
};
pub use batch::{Batch, BatchId, BatchKey, BatchState};
pub use batch_manager::{BatchConfig, BatchError, BatchManager, BatchStats};
pub use vertex::{quad_indices, Quad, Vertex, MAX_INDEXED_QUADS};
pub use window::WindowConfig;

pub use winit;

/// Rendering backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Metal (macOS, iOS)
    Metal,
    /// DirectX 12 (Windows)
    DirectX12,
    /// Vulkan (cross-platform)
    Vulkan,
    /// OpenGL (cross-platform, fallback)
    OpenGL,
    /// No device; submissions are recorded
    Headless,
}

/// Capability probe result
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    pub backend: BackendType,
    pub max_texture_size: u32,
    pub supports_compute: bool,
    pub supports_instancing: bool,
}
