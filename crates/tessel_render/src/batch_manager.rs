//! # Batch Manager
//!
//! Owns a bounded set of batch slots and routes draw calls into them.
//!
//! - Batches are looked up by `(mode, shader, texture)`; a miss activates a
//!   free slot, or appends one while under the slot limit.
//! - A full batch is flushed (rendered, then cleaned) and the quad that
//!   overflowed is submitted once more into the emptied buffer.
//! - One shader or one batch may be forced at a time; the two overrides
//!   exclude each other.

use crate::{
    BackendError, Batch, BatchId, BatchKey, DrawCall, DrawMode, GraphicsBackend, Quad,
    ShaderHandle, TextureHandle,
};
use tessel_core::math::{Camera2D, Colour, Rect, Vec2};
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("could not allocate a vertex buffer of {vertices} vertices")]
    AllocationFailure { vertices: usize },

    #[error("all {max_batches} batch slots are active")]
    CapacityExceeded { max_batches: usize },

    #[error("batch buffer is full ({capacity} quads)")]
    ObjectOverflow { capacity: usize },

    #[error("batch {index} is not active")]
    InvalidBatch { index: usize },

    #[error("cannot force a {requested} while a {active} is forced")]
    ForceConflict {
        requested: &'static str,
        active: &'static str,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Limits applied to every batch the manager creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub max_batches: usize,
    pub max_quads_per_batch: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batches: 32,
            max_quads_per_batch: 1024,
        }
    }
}

/// Counters for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Draw calls issued to the backend.
    pub draw_calls: usize,
    /// Render-and-clean cycles, overflow-driven or not.
    pub flushes: usize,
    /// Flushes forced by a full buffer.
    pub overflows: usize,
    /// Quads accepted into batches.
    pub quads: usize,
}

pub struct BatchManager {
    batches: Vec<Batch>,
    config: BatchConfig,
    default_camera: Camera2D,
    cameras: Vec<Camera2D>,
    forced_shader: Option<ShaderHandle>,
    forced_batch: Option<BatchId>,
    stats: BatchStats,
}

impl BatchManager {
    pub fn new(config: BatchConfig, default_camera: Camera2D) -> Self {
        Self {
            batches: Vec::with_capacity(config.max_batches),
            config,
            default_camera,
            cameras: Vec::new(),
            forced_shader: None,
            forced_batch: None,
            stats: BatchStats::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> BatchConfig {
        self.config
    }

    /// Camera new batches are created with: the top of the camera stack,
    /// or the default camera when the stack is empty.
    pub fn current_camera(&self) -> Camera2D {
        self.cameras.last().copied().unwrap_or(self.default_camera)
    }

    /// Replace the bottom-of-stack camera, e.g. after a window resize.
    pub fn set_default_camera(&mut self, camera: Camera2D) {
        self.default_camera = camera;
        if self.cameras.is_empty() {
            self.retarget(camera);
        }
    }

    /// Active batch matching `key`.
    pub fn get_batch(&self, key: BatchKey) -> Option<BatchId> {
        self.batches
            .iter()
            .position(|b| b.is_active() && b.key() == Some(key))
            .map(BatchId)
    }

    /// Activate a batch for `key` in the first free slot, appending a slot
    /// while under the limit.
    pub fn create_batch(&mut self, key: BatchKey) -> Result<BatchId, BatchError> {
        let index = match self.batches.iter().position(|b| !b.is_active()) {
            Some(index) => index,
            None if self.batches.len() < self.config.max_batches => {
                self.batches.push(Batch::unknown());
                self.batches.len() - 1
            }
            None => {
                return Err(BatchError::CapacityExceeded {
                    max_batches: self.config.max_batches,
                })
            }
        };

        let camera = self.current_camera();
        self.batches[index].activate(key, camera, self.config.max_quads_per_batch)?;
        debug!(index, ?key, "batch created");
        Ok(BatchId(index))
    }

    pub fn get_or_create(&mut self, key: BatchKey) -> Result<BatchId, BatchError> {
        match self.get_batch(key) {
            Some(id) => Ok(id),
            None => self.create_batch(key),
        }
    }

    pub fn batch(&self, id: BatchId) -> Option<&Batch> {
        self.batches.get(id.0).filter(|b| b.is_active())
    }

    fn active_mut(&mut self, id: BatchId) -> Result<&mut Batch, BatchError> {
        self.batches
            .get_mut(id.0)
            .filter(|b| b.is_active())
            .ok_or(BatchError::InvalidBatch { index: id.0 })
    }

    /// Ids of every active batch, in slot order.
    pub fn active_batches(&self) -> Vec<BatchId> {
        self.batches
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_active())
            .map(|(index, _)| BatchId(index))
            .collect()
    }

    /// Return a batch's slot to the free state.
    pub fn destroy_batch(&mut self, id: BatchId) -> Result<(), BatchError> {
        self.active_mut(id)?.deactivate();
        if self.forced_batch == Some(id) {
            self.forced_batch = None;
        }
        debug!(index = id.0, "batch destroyed");
        Ok(())
    }

    /// Submit one quad straight into a batch.
    ///
    /// A full buffer fails with [`BatchError::ObjectOverflow`]; use
    /// [`BatchManager::draw_quad`] for automatic flushing.
    pub fn submit(&mut self, id: BatchId, quad: &Quad) -> Result<(), BatchError> {
        self.active_mut(id)?.submit(quad)?;
        self.stats.quads += 1;
        Ok(())
    }

    /// Issue the draw call for everything submitted to `id`.
    pub fn render(
        &mut self,
        id: BatchId,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<(), BatchError> {
        let batch = self
            .batch(id)
            .ok_or(BatchError::InvalidBatch { index: id.0 })?;
        if batch.submitted() == 0 {
            return Ok(());
        }
        let Some(key) = batch.key() else {
            return Err(BatchError::InvalidBatch { index: id.0 });
        };
        let quads = batch.submitted();

        backend.draw(DrawCall {
            mode: key.mode,
            shader: key.shader,
            texture: key.texture,
            transform: batch.camera().view_projection(),
            vertices: batch.vertices(),
        })?;
        self.stats.draw_calls += 1;
        trace!(index = id.0, quads, "batch rendered");
        Ok(())
    }

    /// Rewind a batch's submission counter.
    pub fn clean(&mut self, id: BatchId) -> Result<(), BatchError> {
        self.active_mut(id)?.clean();
        Ok(())
    }

    /// Render then clean.
    pub fn flush(
        &mut self,
        id: BatchId,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<(), BatchError> {
        self.render(id, backend)?;
        self.clean(id)?;
        self.stats.flushes += 1;
        Ok(())
    }

    /// Flush every active batch; called once at the end of a frame.
    pub fn flush_all(&mut self, backend: &mut dyn GraphicsBackend) -> Result<(), BatchError> {
        for id in self.active_batches() {
            self.flush(id, backend)?;
        }
        Ok(())
    }

    /// Batch a draw for `key` resolves to once forced overrides apply.
    fn resolve(&mut self, key: BatchKey) -> Result<BatchId, BatchError> {
        if let Some(id) = self.forced_batch {
            return Ok(id);
        }
        let key = match self.forced_shader {
            Some(shader) => BatchKey { shader, ..key },
            None => key,
        };
        self.get_or_create(key)
    }

    /// Route one quad to its batch, flushing and retrying once on overflow.
    pub fn draw_quad(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        key: BatchKey,
        quad: &Quad,
    ) -> Result<BatchId, BatchError> {
        let id = self.resolve(key)?;
        match self.submit(id, quad) {
            Err(BatchError::ObjectOverflow { capacity }) => {
                warn!(index = id.0, capacity, "batch overflow, flushing");
                self.flush(id, backend)?;
                self.stats.overflows += 1;
                self.submit(id, quad)?;
            }
            other => other?,
        }
        Ok(id)
    }

    /// Draw a textured sprite: `source` is the normalized texture region.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_sprite(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        shader: ShaderHandle,
        texture: Option<TextureHandle>,
        dest: Rect,
        source: Rect,
        origin: Vec2,
        rotation: f32,
        colour: Colour,
    ) -> Result<BatchId, BatchError> {
        let quad = Quad::sprite(dest, source, origin, rotation, colour);
        let key = BatchKey::new(DrawMode::Triangles, shader, texture);
        self.draw_quad(backend, key, &quad)
    }

    /// Draw an untextured rectangle.
    pub fn draw_rect(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        shader: ShaderHandle,
        dest: Rect,
        colour: Colour,
    ) -> Result<BatchId, BatchError> {
        let key = BatchKey::new(DrawMode::Triangles, shader, None);
        self.draw_quad(backend, key, &Quad::rect(dest, colour))
    }

    /// Force every draw onto `shader` until [`BatchManager::pop_shader`].
    pub fn push_shader(&mut self, shader: ShaderHandle) -> Result<(), BatchError> {
        if self.forced_batch.is_some() {
            return Err(BatchError::ForceConflict {
                requested: "shader",
                active: "batch",
            });
        }
        if self.forced_shader.is_some() {
            return Err(BatchError::ForceConflict {
                requested: "shader",
                active: "shader",
            });
        }
        self.forced_shader = Some(shader);
        Ok(())
    }

    pub fn pop_shader(&mut self) -> Option<ShaderHandle> {
        self.forced_shader.take()
    }

    /// Force every draw into batch `id` until [`BatchManager::pop_batch`].
    pub fn push_batch(&mut self, id: BatchId) -> Result<(), BatchError> {
        if self.forced_shader.is_some() {
            return Err(BatchError::ForceConflict {
                requested: "batch",
                active: "shader",
            });
        }
        if self.forced_batch.is_some() {
            return Err(BatchError::ForceConflict {
                requested: "batch",
                active: "batch",
            });
        }
        self.active_mut(id)?;
        self.forced_batch = Some(id);
        Ok(())
    }

    pub fn pop_batch(&mut self) -> Option<BatchId> {
        self.forced_batch.take()
    }

    /// Flush pending work under the old camera, then switch to `camera`.
    pub fn push_camera(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        camera: Camera2D,
    ) -> Result<(), BatchError> {
        self.flush_all(backend)?;
        self.cameras.push(camera);
        self.retarget(camera);
        Ok(())
    }

    /// Flush pending work, then restore the previous camera.
    pub fn pop_camera(
        &mut self,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<Option<Camera2D>, BatchError> {
        self.flush_all(backend)?;
        let popped = self.cameras.pop();
        self.retarget(self.current_camera());
        Ok(popped)
    }

    fn retarget(&mut self, camera: Camera2D) {
        for batch in self.batches.iter_mut().filter(|b| b.is_active()) {
            batch.set_camera(camera);
        }
    }

    #[inline]
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Return this frame's counters and start a new frame.
    pub fn reset_stats(&mut self) -> BatchStats {
        std::mem::take(&mut self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeadlessBackend;

    struct Fixture {
        backend: HeadlessBackend,
        manager: BatchManager,
        shader: ShaderHandle,
        texture: TextureHandle,
    }

    fn fixture(max_batches: usize, max_quads: usize) -> Fixture {
        let mut backend = HeadlessBackend::new();
        let shader = backend.create_shader(1).unwrap();
        let texture = backend.create_texture(2).unwrap();
        let manager = BatchManager::new(
            BatchConfig {
                max_batches,
                max_quads_per_batch: max_quads,
            },
            Camera2D::new(Vec2::new(320.0, 240.0)),
        );
        Fixture {
            backend,
            manager,
            shader,
            texture,
        }
    }

    fn quad(x: f32) -> Quad {
        Quad::rect(Rect::new(x, 0.0, 1.0, 1.0), Colour::WHITE)
    }

    #[test]
    fn lookup_after_create_is_stable() {
        let mut f = fixture(4, 8);
        let key = BatchKey::new(DrawMode::Triangles, f.shader, Some(f.texture));

        assert_eq!(f.manager.get_batch(key), None);
        let created = f.manager.create_batch(key).unwrap();
        assert_eq!(f.manager.get_batch(key), Some(created));
        assert_eq!(f.manager.get_batch(key), Some(created));

        let other = BatchKey::new(DrawMode::Lines, f.shader, Some(f.texture));
        assert_eq!(f.manager.get_batch(other), None);
    }

    #[test]
    fn overflow_flushes_once_and_retries() {
        let mut f = fixture(2, 3);
        let key = BatchKey::new(DrawMode::Triangles, f.shader, None);

        for x in 0..3 {
            f.manager.draw_quad(&mut f.backend, key, &quad(x as f32)).unwrap();
        }
        assert!(f.backend.draws().is_empty());

        let id = f.manager.draw_quad(&mut f.backend, key, &quad(7.0)).unwrap();

        let draws = f.backend.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vertices.len(), 12);

        let batch = f.manager.batch(id).unwrap();
        assert_eq!(batch.submitted(), 1);
        assert_eq!(batch.vertices()[0].position, [7.0, 0.0]);

        let stats = f.manager.stats();
        assert_eq!((stats.flushes, stats.overflows, stats.quads), (1, 1, 4));
    }

    #[test]
    fn plain_submit_reports_overflow() {
        let mut f = fixture(1, 1);
        let key = BatchKey::new(DrawMode::Triangles, f.shader, None);
        let id = f.manager.create_batch(key).unwrap();
        f.manager.submit(id, &quad(0.0)).unwrap();
        assert!(matches!(
            f.manager.submit(id, &quad(1.0)),
            Err(BatchError::ObjectOverflow { capacity: 1 })
        ));
    }

    #[test]
    fn slots_are_bounded_and_reused() {
        let mut f = fixture(2, 4);
        let a = BatchKey::new(DrawMode::Triangles, f.shader, None);
        let b = BatchKey::new(DrawMode::Lines, f.shader, None);
        let c = BatchKey::new(DrawMode::Points, f.shader, None);

        let first = f.manager.create_batch(a).unwrap();
        f.manager.create_batch(b).unwrap();
        assert!(matches!(
            f.manager.create_batch(c),
            Err(BatchError::CapacityExceeded { max_batches: 2 })
        ));

        f.manager.destroy_batch(first).unwrap();
        assert!(f.manager.batch(first).is_none());
        assert_eq!(f.manager.get_batch(a), None);

        let reused = f.manager.create_batch(c).unwrap();
        assert_eq!(reused, first);
        assert!(matches!(
            f.manager.destroy_batch(BatchId(5)),
            Err(BatchError::InvalidBatch { index: 5 })
        ));
    }

    #[test]
    fn forced_shader_and_batch_exclude_each_other() {
        let mut f = fixture(4, 4);
        let key = BatchKey::new(DrawMode::Triangles, f.shader, None);
        let id = f.manager.create_batch(key).unwrap();

        f.manager.push_batch(id).unwrap();
        assert!(matches!(
            f.manager.push_shader(f.shader),
            Err(BatchError::ForceConflict {
                requested: "shader",
                active: "batch"
            })
        ));

        assert_eq!(f.manager.pop_batch(), Some(id));
        f.manager.push_shader(f.shader).unwrap();
        assert!(matches!(
            f.manager.push_batch(id),
            Err(BatchError::ForceConflict { .. })
        ));
        assert!(f.manager.push_shader(f.shader).is_err());
        assert_eq!(f.manager.pop_shader(), Some(f.shader));
        assert_eq!(f.manager.pop_shader(), None);
    }

    #[test]
    fn forced_shader_rekeys_draws() {
        let mut f = fixture(4, 4);
        let override_shader = f.backend.create_shader(9).unwrap();
        f.manager.push_shader(override_shader).unwrap();

        let requested = BatchKey::new(DrawMode::Triangles, f.shader, Some(f.texture));
        let id = f.manager.draw_quad(&mut f.backend, requested, &quad(0.0)).unwrap();
        assert_eq!(
            f.manager.batch(id).unwrap().key().map(|k| k.shader),
            Some(override_shader)
        );
        assert_eq!(f.manager.get_batch(requested), None);
    }

    #[test]
    fn forced_batch_captures_every_draw() {
        let mut f = fixture(4, 4);
        let target = f
            .manager
            .create_batch(BatchKey::new(DrawMode::Lines, f.shader, None))
            .unwrap();
        f.manager.push_batch(target).unwrap();

        let key = BatchKey::new(DrawMode::Triangles, f.shader, Some(f.texture));
        assert_eq!(
            f.manager.draw_quad(&mut f.backend, key, &quad(0.0)).unwrap(),
            target
        );
        assert_eq!(f.manager.active_batches(), vec![target]);

        f.manager.destroy_batch(target).unwrap();
        assert_eq!(f.manager.pop_batch(), None);
    }

    #[test]
    fn flush_all_renders_non_empty_batches() {
        let mut f = fixture(4, 4);
        f.manager
            .draw_rect(&mut f.backend, f.shader, Rect::new(0.0, 0.0, 2.0, 2.0), Colour::RED)
            .unwrap();
        f.manager
            .draw_sprite(
                &mut f.backend,
                f.shader,
                Some(f.texture),
                Rect::new(0.0, 0.0, 2.0, 2.0),
                Rect::new(0.0, 0.0, 1.0, 1.0),
                Vec2::ZERO,
                0.0,
                Colour::WHITE,
            )
            .unwrap();
        f.manager
            .create_batch(BatchKey::new(DrawMode::Points, f.shader, None))
            .unwrap();

        f.manager.flush_all(&mut f.backend).unwrap();
        assert_eq!(f.backend.draws().len(), 2);
        assert_eq!(f.manager.reset_stats().draw_calls, 2);
        assert_eq!(f.manager.stats(), BatchStats::default());

        f.manager.flush_all(&mut f.backend).unwrap();
        assert_eq!(f.backend.draws().len(), 2);
    }

    #[test]
    fn camera_push_flushes_and_retargets() {
        let mut f = fixture(4, 4);
        let key = BatchKey::new(DrawMode::Triangles, f.shader, None);
        let id = f.manager.draw_quad(&mut f.backend, key, &quad(0.0)).unwrap();

        let zoomed = Camera2D::new(Vec2::new(320.0, 240.0)).with_zoom(2.0);
        f.manager.push_camera(&mut f.backend, zoomed).unwrap();
        assert_eq!(f.backend.draws().len(), 1);
        assert_eq!(f.manager.batch(id).unwrap().camera(), &zoomed);
        assert_eq!(f.manager.current_camera(), zoomed);

        f.manager.draw_quad(&mut f.backend, key, &quad(1.0)).unwrap();
        assert_eq!(f.manager.pop_camera(&mut f.backend).unwrap(), Some(zoomed));
        let draws = f.backend.take_draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].transform, zoomed.view_projection());
        assert_eq!(f.manager.batch(id).unwrap().camera().zoom, 1.0);
    }

    #[test]
    fn unknown_shader_surfaces_backend_error() {
        let mut f = fixture(1, 1);
        let key = BatchKey::new(DrawMode::Triangles, ShaderHandle(77), None);
        let id = f.manager.draw_quad(&mut f.backend, key, &quad(0.0)).unwrap();
        assert!(matches!(
            f.manager.flush(id, &mut f.backend),
            Err(BatchError::Backend(BackendError::UnknownShader(_)))
        ));
    }
}
