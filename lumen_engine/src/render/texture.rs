use std::path::Path;
use std::rc::Rc;

use derivative::Derivative;
use getset::CopyGetters;
use strum_macros::Display;
use tracing::{instrument, warn};
use valuable::Valuable;

use crate::core::targets::RENDER;
use crate::core::types::GpuId;
use crate::render::bitmap::{Bitmap, PixelLayout};
use crate::render::context::RenderContext;
use crate::render::handle::GpuHandle;

/// Texture sampling filter, with the matching OpenGL enum as the discriminant
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Display, Valuable)]
#[repr(u32)]
pub enum TextureFilter {
    Nearest = 0x2600,
    #[default]
    Linear = 0x2601,
}

/// An image uploaded to the GPU.
///
/// A texture whose source failed to load is *empty*: it has no GPU object and is skipped when bound.
#[derive(Derivative, CopyGetters, Clone)]
#[derivative(Debug)]
pub struct Texture {
    handle: Option<Rc<GpuHandle>>,
    #[getset(get_copy = "pub")]
    width: u32,
    #[getset(get_copy = "pub")]
    height: u32,
}

impl Texture {
    pub fn empty() -> Self {
        Self {
            handle: None,
            width: 0,
            height: 0,
        }
    }

    /// Uploads a loaded bitmap. Bitmaps that failed to load give an empty texture
    pub fn from_bitmap(ctx: &mut RenderContext, bitmap: &Bitmap, min_filter: TextureFilter, mag_filter: TextureFilter) -> Self {
        if !bitmap.is_loaded() {
            return Self::empty();
        }
        let pixels = bitmap.pixel_buffer(PixelLayout::Rgba);
        let handle = ctx.create_texture(bitmap.width(), bitmap.height(), &pixels, min_filter, mag_filter);
        Self {
            handle: Some(handle),
            width: bitmap.width(),
            height: bitmap.height(),
        }
    }

    /// Loads a bitmap from disk and uploads it
    #[instrument(level = "debug", skip(ctx, path), fields(path = ?path.as_ref()))]
    pub fn load_from_file(
        ctx: &mut RenderContext,
        path: impl AsRef<Path>,
        min_filter: TextureFilter,
        mag_filter: TextureFilter,
    ) -> Rc<Self> {
        let bitmap = Bitmap::load(path.as_ref());
        if !bitmap.is_loaded() {
            warn!(target: RENDER, path = ?path.as_ref(), status = %bitmap.status(), "{}", bitmap.status().description());
        }
        Rc::new(Self::from_bitmap(ctx, &bitmap, min_filter, mag_filter))
    }

    pub fn is_empty(&self) -> bool { self.handle.is_none() }

    pub fn id(&self) -> Option<GpuId> { self.handle.as_ref().map(|h| h.id()) }
}
