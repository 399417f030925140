//! Tessel Asset Registry
//!
//! Shaders, textures and fonts registered under 64-bit asset ids. Loading
//! asks the graphics backend for a handle once; lookups hand that handle to
//! the batch manager.

use std::fmt;

use tessel_core::pool::{PoolError, UniquePool};
use tessel_render::{BackendError, GraphicsBackend, ShaderHandle, TextureHandle};
use thiserror::Error;
use tracing::debug;

/// Initial slots per asset kind; the pools grow on demand.
const ASSETS_HINT: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AssetKind {
    Shader,
    Texture,
    Font,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Shader => "shader",
            AssetKind::Texture => "texture",
            AssetKind::Font => "font",
        })
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{kind} {id} is already loaded")]
    AlreadyLoaded { kind: AssetKind, id: u64 },

    #[error("{kind} {id} is not loaded")]
    NotFound { kind: AssetKind, id: u64 },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// A font is a glyph atlas texture rendered at one pixel size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Font {
    pub atlas: TextureHandle,
    pub size: f32,
}

pub struct AssetManager {
    shaders: UniquePool<ShaderHandle>,
    textures: UniquePool<TextureHandle>,
    fonts: UniquePool<Font>,
}

impl AssetManager {
    pub fn new() -> Result<Self, AssetError> {
        Ok(Self {
            shaders: UniquePool::growable(ASSETS_HINT)?,
            textures: UniquePool::growable(ASSETS_HINT)?,
            fonts: UniquePool::growable(ASSETS_HINT)?,
        })
    }

    pub fn load_shader(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        id: u64,
    ) -> Result<ShaderHandle, AssetError> {
        if self.shaders.contains(id) {
            return Err(AssetError::AlreadyLoaded {
                kind: AssetKind::Shader,
                id,
            });
        }
        let handle = backend.create_shader(id)?;
        self.shaders.append(id, handle)?;
        debug!(id, ?handle, "shader loaded");
        Ok(handle)
    }

    pub fn shader(&self, id: u64) -> Result<ShaderHandle, AssetError> {
        self.shaders.get(id).copied().map_err(|_| AssetError::NotFound {
            kind: AssetKind::Shader,
            id,
        })
    }

    pub fn load_texture(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        id: u64,
    ) -> Result<TextureHandle, AssetError> {
        if self.textures.contains(id) {
            return Err(AssetError::AlreadyLoaded {
                kind: AssetKind::Texture,
                id,
            });
        }
        let handle = backend.create_texture(id)?;
        self.textures.append(id, handle)?;
        debug!(id, ?handle, "texture loaded");
        Ok(handle)
    }

    pub fn texture(&self, id: u64) -> Result<TextureHandle, AssetError> {
        self.textures.get(id).copied().map_err(|_| AssetError::NotFound {
            kind: AssetKind::Texture,
            id,
        })
    }

    /// Load font `id` at `size` pixels; its atlas is a backend texture.
    pub fn load_font(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        id: u64,
        size: f32,
    ) -> Result<Font, AssetError> {
        if self.fonts.contains(id) {
            return Err(AssetError::AlreadyLoaded {
                kind: AssetKind::Font,
                id,
            });
        }
        let font = Font {
            atlas: backend.create_texture(id)?,
            size,
        };
        self.fonts.append(id, font)?;
        debug!(id, size, "font loaded");
        Ok(font)
    }

    pub fn font(&self, id: u64) -> Result<Font, AssetError> {
        self.fonts.get(id).copied().map_err(|_| AssetError::NotFound {
            kind: AssetKind::Font,
            id,
        })
    }

    /// Forget an asset. The backend object is left to the backend.
    pub fn unload(&mut self, kind: AssetKind, id: u64) -> Result<(), AssetError> {
        let removed = match kind {
            AssetKind::Shader => self.shaders.remove(id),
            AssetKind::Texture => self.textures.remove(id),
            AssetKind::Font => self.fonts.remove(id),
        };
        if !removed {
            return Err(AssetError::NotFound { kind, id });
        }
        debug!(%kind, id, "asset unloaded");
        Ok(())
    }

    pub fn loaded(&self, kind: AssetKind) -> usize {
        match kind {
            AssetKind::Shader => self.shaders.occupied(),
            AssetKind::Texture => self.textures.occupied(),
            AssetKind::Font => self.fonts.occupied(),
        }
    }
}
