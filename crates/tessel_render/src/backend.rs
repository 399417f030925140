//! Rendering backend abstraction
//!
//! The batch manager talks to the GPU only through [`GraphicsBackend`].
//! [`HeadlessBackend`] implements it without a device and records every
//! draw call, which is what tests and the headless runtime use.

use crate::{BackendType, DeviceCapabilities, Vertex};
use glam::Mat4;
use tessel_core::math::Colour;
use thiserror::Error;

/// Backend-side shader program handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Backend-side texture handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Primitive topology of a batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Quads expanded to two triangles each (see [`crate::quad_indices`]).
    Triangles,
    /// Quad outlines.
    Lines,
    Points,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("shader {0:?} was never created")]
    UnknownShader(ShaderHandle),

    #[error("texture {0:?} was never created")]
    UnknownTexture(TextureHandle),

    #[error("graphics device lost: {reason}")]
    DeviceLost { reason: String },
}

/// One draw submission: every vertex of a batch under a single state.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub mode: DrawMode,
    pub shader: ShaderHandle,
    pub texture: Option<TextureHandle>,
    pub transform: Mat4,
    pub vertices: &'a [Vertex],
}

/// Narrow interface onto a graphics API.
pub trait GraphicsBackend {
    fn capabilities(&self) -> DeviceCapabilities;

    /// Create the shader program for asset `asset_id`.
    fn create_shader(&mut self, asset_id: u64) -> Result<ShaderHandle, BackendError>;

    /// Create the texture for asset `asset_id`.
    fn create_texture(&mut self, asset_id: u64) -> Result<TextureHandle, BackendError>;

    fn set_viewport(&mut self, width: u32, height: u32);

    fn clear(&mut self, colour: Colour);

    fn draw(&mut self, call: DrawCall<'_>) -> Result<(), BackendError>;

    fn swap_buffers(&mut self) -> Result<(), BackendError>;
}

/// Owned copy of a [`DrawCall`], kept by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub mode: DrawMode,
    pub shader: ShaderHandle,
    pub texture: Option<TextureHandle>,
    pub transform: Mat4,
    pub vertices: Vec<Vertex>,
}

/// Device-free backend that validates handles and records submissions.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    shaders: Vec<ShaderHandle>,
    textures: Vec<TextureHandle>,
    draws: Vec<RecordedDraw>,
    viewport: (u32, u32),
    clear_colour: Option<Colour>,
    frames: u64,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls since the last [`HeadlessBackend::take_draws`].
    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    pub fn take_draws(&mut self) -> Vec<RecordedDraw> {
        std::mem::take(&mut self.draws)
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn clear_colour(&self) -> Option<Colour> {
        self.clear_colour
    }

    /// Number of completed buffer swaps.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities {
            backend: BackendType::Headless,
            max_texture_size: 8192,
            supports_compute: false,
            supports_instancing: false,
        }
    }

    fn create_shader(&mut self, asset_id: u64) -> Result<ShaderHandle, BackendError> {
        let handle = ShaderHandle(self.next_handle());
        self.shaders.push(handle);
        tracing::trace!(asset_id, ?handle, "headless shader created");
        Ok(handle)
    }

    fn create_texture(&mut self, asset_id: u64) -> Result<TextureHandle, BackendError> {
        let handle = TextureHandle(self.next_handle());
        self.textures.push(handle);
        tracing::trace!(asset_id, ?handle, "headless texture created");
        Ok(handle)
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn clear(&mut self, colour: Colour) {
        self.clear_colour = Some(colour);
    }

    fn draw(&mut self, call: DrawCall<'_>) -> Result<(), BackendError> {
        if !self.shaders.contains(&call.shader) {
            return Err(BackendError::UnknownShader(call.shader));
        }
        if let Some(texture) = call.texture {
            if !self.textures.contains(&texture) {
                return Err(BackendError::UnknownTexture(texture));
            }
        }
        self.draws.push(RecordedDraw {
            mode: call.mode,
            shader: call.shader,
            texture: call.texture,
            transform: call.transform,
            vertices: call.vertices.to_vec(),
        });
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), BackendError> {
        self.frames += 1;
        Ok(())
    }
}

/// Probe available rendering capabilities of a backend.
pub fn probe_capabilities(backend: &dyn GraphicsBackend) -> DeviceCapabilities {
    let caps = backend.capabilities();
    tracing::info!(
        backend = ?caps.backend,
        max_texture_size = caps.max_texture_size,
        "graphics backend selected"
    );
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_validates_handles() {
        let mut backend = HeadlessBackend::new();
        let shader = backend.create_shader(1).unwrap();
        let texture = backend.create_texture(2).unwrap();
        assert_ne!(shader.0, texture.0);

        let call = DrawCall {
            mode: DrawMode::Triangles,
            shader,
            texture: Some(texture),
            transform: Mat4::IDENTITY,
            vertices: &[],
        };
        backend.draw(call).unwrap();
        assert_eq!(backend.draws().len(), 1);

        let bogus = DrawCall {
            shader: ShaderHandle(99),
            ..call
        };
        assert!(matches!(
            backend.draw(bogus),
            Err(BackendError::UnknownShader(ShaderHandle(99)))
        ));

        let bad_texture = DrawCall {
            texture: Some(TextureHandle(42)),
            ..call
        };
        assert!(matches!(
            backend.draw(bad_texture),
            Err(BackendError::UnknownTexture(TextureHandle(42)))
        ));
    }

    #[test]
    fn frame_bookkeeping() {
        let mut backend = HeadlessBackend::new();
        backend.set_viewport(640, 480);
        backend.clear(Colour::BLACK);
        backend.swap_buffers().unwrap();

        assert_eq!(backend.viewport(), (640, 480));
        assert_eq!(backend.clear_colour(), Some(Colour::BLACK));
        assert_eq!(backend.frames(), 1);
        assert_eq!(probe_capabilities(&backend).backend, BackendType::Headless);
    }
}
