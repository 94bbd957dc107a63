use std::path::Path;

use derivative::Derivative;
use getset::CopyGetters;
use image::RgbaImage;
use strum_macros::Display;
use tracing::{debug, warn};
use valuable::Valuable;

use crate::core::targets::RENDER;

/// Outcome of loading a [Bitmap]. Failing to load is not an error, just an empty bitmap
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, Valuable)]
pub enum LoadStatus {
    Ok,
    FileNotFound,
    /// The file exists but couldn't be decoded
    Unsupported,
    Unloaded,
}

impl LoadStatus {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ok => "bitmap loaded successfully",
            Self::FileNotFound => "bitmap file not found",
            Self::Unsupported => "bitmap format not supported",
            Self::Unloaded => "bitmap not loaded",
        }
    }
}

/// Channel order when packing a pixel into a `u32`.
///
/// The first named channel is the lowest byte, so a packed buffer has the channels in this order in memory
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Display, Valuable)]
pub enum PixelLayout {
    /// The order the decoder produced, which is always RGBA
    Original,
    #[default]
    Rgba,
    Argb,
    Bgra,
}

impl PixelLayout {
    fn pack(self, [r, g, b, a]: [u8; 4]) -> u32 {
        u32::from_le_bytes(match self {
            Self::Original | Self::Rgba => [r, g, b, a],
            Self::Argb => [a, r, g, b],
            Self::Bgra => [b, g, r, a],
        })
    }
}

/// A decoded image, kept in memory as 8-bit RGBA
#[derive(Derivative, CopyGetters, Clone)]
#[derivative(Debug)]
pub struct Bitmap {
    #[getset(get_copy = "pub")]
    status: LoadStatus,
    #[derivative(Debug = "ignore")]
    image: RgbaImage,
}

impl Bitmap {
    /// Decodes the image at `path`. Any failure is reported through [Self::status]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.is_file() {
            debug!(target: RENDER, ?path, "bitmap file not found");
            return Self::unloaded(LoadStatus::FileNotFound);
        }

        match image::open(path) {
            Ok(img) => Self {
                status: LoadStatus::Ok,
                image: img.into_rgba8(),
            },
            Err(err) => {
                warn!(target: RENDER, ?path, %err, "couldn't decode bitmap");
                Self::unloaded(LoadStatus::Unsupported)
            }
        }
    }

    /// Wraps already decoded pixels, row by row
    ///
    /// Returns [None] if `pixels` doesn't hold exactly `width * height` entries
    pub fn from_rgba(width: u32, height: u32, pixels: &[[u8; 4]]) -> Option<Self> {
        let image = RgbaImage::from_raw(width, height, pixels.concat())?;
        Some(Self {
            status: LoadStatus::Ok,
            image,
        })
    }

    fn unloaded(status: LoadStatus) -> Self {
        Self {
            status,
            image: RgbaImage::new(0, 0),
        }
    }

    pub fn is_loaded(&self) -> bool { self.status == LoadStatus::Ok }

    pub fn width(&self) -> u32 { self.image.width() }

    pub fn height(&self) -> u32 { self.image.height() }

    /// The packed pixel at `(x, y)`, with `(0, 0)` the top-left. Out of range reads give `0`
    pub fn pixel(&self, x: u32, y: u32, layout: PixelLayout) -> u32 {
        self.image
            .get_pixel_checked(x, y)
            .map_or(0, |px| layout.pack(px.0))
    }

    /// Every pixel packed with `layout`, row by row
    pub fn pixel_buffer(&self, layout: PixelLayout) -> Vec<u32> {
        self.image.pixels().map(|px| layout.pack(px.0)).collect()
    }
}
