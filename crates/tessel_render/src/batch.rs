//! A single render batch
//!
//! A batch groups quads sharing one draw mode, shader and texture. Its
//! vertex buffer is sized once on activation and reused across frames:
//! cleaning only rewinds the submission counter.

use crate::{BatchError, DrawMode, Quad, ShaderHandle, TextureHandle, Vertex};
use tessel_core::math::Camera2D;

/// Lookup key of a batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub mode: DrawMode,
    pub shader: ShaderHandle,
    pub texture: Option<TextureHandle>,
}

impl BatchKey {
    pub fn new(mode: DrawMode, shader: ShaderHandle, texture: Option<TextureHandle>) -> Self {
        Self {
            mode,
            shader,
            texture,
        }
    }
}

/// Slot index of a batch inside its manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BatchId(pub(crate) usize);

impl BatchId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BatchState {
    /// Free slot, available for reuse.
    Unknown,
    Active,
}

pub struct Batch {
    state: BatchState,
    key: Option<BatchKey>,
    camera: Camera2D,
    vertices: Vec<Vertex>,
    max_quads: usize,
    submitted: usize,
}

impl Batch {
    pub(crate) fn unknown() -> Self {
        Self {
            state: BatchState::Unknown,
            key: None,
            camera: Camera2D::default(),
            vertices: Vec::new(),
            max_quads: 0,
            submitted: 0,
        }
    }

    /// Bring a free slot into service under `key`.
    ///
    /// The vertex buffer keeps any memory from a previous activation.
    pub(crate) fn activate(
        &mut self,
        key: BatchKey,
        camera: Camera2D,
        max_quads: usize,
    ) -> Result<(), BatchError> {
        let vertices = max_quads.max(1) * 4;
        self.vertices.clear();
        self.vertices
            .try_reserve_exact(vertices)
            .map_err(|_| BatchError::AllocationFailure { vertices })?;
        self.state = BatchState::Active;
        self.key = Some(key);
        self.camera = camera;
        self.max_quads = max_quads.max(1);
        self.submitted = 0;
        Ok(())
    }

    /// Return the slot to the free state.
    pub(crate) fn deactivate(&mut self) {
        self.state = BatchState::Unknown;
        self.key = None;
        self.submitted = 0;
    }

    #[inline]
    pub fn state(&self) -> BatchState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == BatchState::Active
    }

    #[inline]
    pub fn key(&self) -> Option<BatchKey> {
        self.key
    }

    #[inline]
    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub(crate) fn set_camera(&mut self, camera: Camera2D) {
        self.camera = camera;
    }

    /// Quads submitted since the last clean.
    #[inline]
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Quads the buffer holds before overflowing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_quads
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.submitted >= self.max_quads
    }

    /// Vertices submitted since the last clean.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices[..self.submitted * 4]
    }

    /// Raw bytes of the submitted vertices, ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices())
    }

    /// Append one quad, or fail with [`BatchError::ObjectOverflow`] when full.
    pub fn submit(&mut self, quad: &Quad) -> Result<(), BatchError> {
        if self.is_full() {
            return Err(BatchError::ObjectOverflow {
                capacity: self.max_quads,
            });
        }
        let start = self.submitted * 4;
        if self.vertices.len() >= start + 4 {
            self.vertices[start..start + 4].copy_from_slice(quad.vertices());
        } else {
            self.vertices.truncate(start);
            self.vertices.extend_from_slice(quad.vertices());
        }
        self.submitted += 1;
        Ok(())
    }

    /// Rewind the submission counter; the buffer memory is kept.
    pub fn clean(&mut self) {
        self.submitted = 0;
    }
}
