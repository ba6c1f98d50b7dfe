//! Video Memory - the owned service the render pipeline talks to
//!
//! Bundles the tile space and the param table. Both live in background map
//! memory: the param table takes the top segments and textures get the rest.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut video = VideoMemory::new(&EngineConfig::default())?;
//!
//! // Stage load
//! video.reset();
//! video.textures_mut().preload(&stage_textures)?;
//!
//! // Sprite construction
//! let sprite = video.realize_sprite(7, &spec, Alignment::ANY, Some(TransformMode::Affine))?;
//!
//! // Once per frame
//! video.defragment_step();
//! ```

use tessera_core::{ConfigResult, EngineConfig};

use crate::error::RenderResult;
use crate::param::{Defrag, ParamSpaceAllocator, ParamSprite, SpriteHandle, TransformMode};
use crate::texture::{Alignment, TextureId, TextureSpaceAllocator, TextureSpec};

/// Video memory held by one realized sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealizedSprite {
    /// The sprite.
    pub handle: SpriteHandle,
    /// Its texture.
    pub texture: TextureId,
    /// Its transform, if it holds param table rows.
    pub mode: Option<TransformMode>,
}

/// Tile space and param table of one console.
pub struct VideoMemory {
    /// Configuration the allocators were built from
    config: EngineConfig,
    /// Texture placement
    textures: TextureSpaceAllocator,
    /// Param table placement
    params: ParamSpaceAllocator,
}

impl VideoMemory {
    /// Builds both allocators and reserves the configured param table.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is inconsistent.
    pub fn new(config: &EngineConfig) -> ConfigResult<Self> {
        config.validate()?;

        let mut video = Self {
            config: config.clone(),
            textures: TextureSpaceAllocator::new(config.texture_space, config.profile)?,
            params: ParamSpaceAllocator::new(config.param_table, config.profile)?,
        };
        video.configure_param_table(config.param_table.segments);
        Ok(video)
    }

    /// Configuration in use.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Tile space.
    #[inline]
    #[must_use]
    pub fn textures(&self) -> &TextureSpaceAllocator {
        &self.textures
    }

    /// Tile space, mutably.
    #[inline]
    pub fn textures_mut(&mut self) -> &mut TextureSpaceAllocator {
        &mut self.textures
    }

    /// Param table.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &ParamSpaceAllocator {
        &self.params
    }

    /// Param table, mutably.
    #[inline]
    pub fn params_mut(&mut self) -> &mut ParamSpaceAllocator {
        &mut self.params
    }

    /// Gives `segments` background segments to the param table and the rest
    /// to textures. Returns the table size in bytes.
    pub fn configure_param_table(&mut self, segments: u16) -> u32 {
        let total = self.config.texture_space.bgmap_segments;
        let segments = segments.min(total);
        self.textures.configure(total - segments);
        self.params.configure(segments)
    }

    /// Stage load: forgets every texture and param allocation.
    pub fn reset(&mut self) {
        self.textures.reset();
        self.params.reset();
        self.configure_param_table(self.config.param_table.segments);
    }

    /// Gives a sprite its texture and, for transformed sprites, its param
    /// table rows.
    ///
    /// # Errors
    ///
    /// Fails if either allocator has no room. The texture user is dropped
    /// again when the param table is full.
    pub fn realize_sprite(
        &mut self,
        handle: u32,
        spec: &TextureSpec,
        alignment: Alignment,
        mode: Option<TransformMode>,
    ) -> RenderResult<RealizedSprite> {
        let texture = self.textures.get_texture(spec, alignment)?;

        if let Some(mode) = mode {
            let sprite = ParamSprite {
                handle: SpriteHandle(handle),
                texture: spec.id,
                texture_rows: spec.rows,
                shared: spec.is_shared(),
                mode,
            };
            if let Err(error) = self.params.allocate(sprite) {
                self.textures.release_texture(texture)?;
                return Err(error.into());
            }
        }

        Ok(RealizedSprite {
            handle: SpriteHandle(handle),
            texture,
            mode,
        })
    }

    /// Gives back what [`VideoMemory::realize_sprite`] handed out.
    ///
    /// # Errors
    ///
    /// Fails if the sprite's texture or rows are unknown.
    pub fn release_sprite(&mut self, sprite: &RealizedSprite) -> RenderResult<()> {
        if sprite.mode.is_some() {
            self.params.free(sprite.handle)?;
        }
        self.textures.release_texture(sprite.texture)?;
        Ok(())
    }

    /// One compaction step of the param table; call once per frame.
    pub fn defragment_step(&mut self) -> Defrag {
        self.params.defragment(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::BuildProfile;
    use tessera_shared::constants::BGMAP_SEGMENT_SIZE;

    fn config() -> EngineConfig {
        EngineConfig {
            profile: BuildProfile::Shipping,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_param_table_takes_top_segments() {
        let mut video = VideoMemory::new(&config()).unwrap();
        assert_eq!(video.textures().available_segments(), 13);
        assert_eq!(video.params().table_bytes(), BGMAP_SEGMENT_SIZE);

        assert_eq!(video.configure_param_table(3), 3 * BGMAP_SEGMENT_SIZE);
        assert_eq!(video.textures().available_segments(), 11);

        video.reset();
        assert_eq!(video.textures().available_segments(), 13);
    }

    #[test]
    fn test_realize_and_release() {
        let mut video = VideoMemory::new(&config()).unwrap();
        let spec = TextureSpec::new(1, 8, 8);

        let sprite = video
            .realize_sprite(1, &spec, Alignment::ANY, Some(TransformMode::Affine))
            .unwrap();
        assert_eq!(video.params().offset(sprite.handle), Some(0));
        assert_eq!(video.textures().usage_count(sprite.texture), Some(1));

        video.release_sprite(&sprite).unwrap();
        assert_eq!(video.textures().usage_count(sprite.texture), Some(0));
        assert_eq!(video.defragment_step(), Defrag::Recovered { bytes: 9 * 256 });
        assert_eq!(video.params().used_bytes(), 0);
    }

    #[test]
    fn test_full_param_table_drops_texture_user() {
        let mut video = VideoMemory::new(&config()).unwrap();
        // 31 rows plus padding cost the whole 8192 byte table, which is
        // never filled to the last byte.
        let spec = TextureSpec::new(1, 8, 31).shared();

        let error = video
            .realize_sprite(1, &spec, Alignment::ANY, Some(TransformMode::Affine))
            .unwrap_err();
        assert!(matches!(error, crate::RenderError::Param(_)));
        assert_eq!(video.textures().usage_count(TextureId(0)), Some(0));
    }
}
