//! Binary cache of parsed mesh geometry.
//!
//! A cache file sits in a directory next to its source (`<dir>/.cache/<name>.bin` by default) and holds
//! the fully built faces, so that large meshes don't need to be parsed again.
//!
//! # Format
//! All integers and floats are little-endian.
//!
//! | field          | type       |
//! |----------------|------------|
//! | version        | `u32`      |
//! | source mtime   | `i64` secs, `u32` nanos |
//! | bounding box   | `6 x f32` (min, max) |
//! | vertex stride  | `u32`      |
//! | faces          | `3 * stride` bytes each, interleaved as in the vertex buffer |
//!
//! A cache is only used if its version, its stored mtime and its stride all match exactly.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, trace};
use valuable::Valuable;

use crate::core::targets::CACHE;
use crate::core::types::Vector3;
use crate::mesh::attribute::{AttributeSet, VertexLayout};
use crate::mesh::face::Face;
use crate::shared::aabb::BoundingBox;

/// Bumped whenever the file layout changes, so that old caches are ignored
pub const CACHE_VERSION: u32 = 4;

const HEADER_SIZE: usize = 4 + 8 + 4 + 6 * 4 + 4;

/// A file modification time, as stored in the cache header
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Valuable)]
pub struct Timestamp {
    /// Whole seconds since the unix epoch; negative before it
    pub secs: i64,
    /// Nanoseconds past `secs`, always `< 1_000_000_000`
    pub nanos: u32,
}

impl Timestamp {
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(d) => Self {
                secs: d.as_secs() as i64,
                nanos: d.subsec_nanos(),
            },
            Err(before) => {
                let d = before.duration();
                match d.subsec_nanos() {
                    0 => Self {
                        secs: -(d.as_secs() as i64),
                        nanos: 0,
                    },
                    n => Self {
                        secs: -(d.as_secs() as i64) - 1,
                        nanos: 1_000_000_000 - n,
                    },
                }
            }
        }
    }

    pub fn to_system_time(self) -> SystemTime {
        let whole = Duration::from_secs(self.secs.unsigned_abs());
        let base = if self.secs >= 0 { UNIX_EPOCH + whole } else { UNIX_EPOCH - whole };
        base + Duration::from_nanos(self.nanos as u64)
    }

    /// The last modification time of the file at `path`
    pub fn of_file(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::from_system_time(std::fs::metadata(path)?.modified()?))
    }
}

/// The decoded contents of a cache file
#[derive(Clone, Debug, PartialEq)]
pub struct CacheRecord<A: AttributeSet> {
    pub version: u32,
    pub source_mtime: Timestamp,
    pub bbox: BoundingBox,
    pub stride: u32,
    pub faces: Vec<Face<A>>,
}

/// Why a cache couldn't be used. None of these are errors for the loader, which just parses the source
#[derive(Error, Debug)]
pub enum CacheMiss {
    #[error("no cache file")]
    Missing,
    #[error("couldn't read cache or source file")]
    Io(#[from] io::Error),
    #[error("cache version {found} doesn't match current version {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("source was modified since the cache was written ({cached:?} != {current:?})")]
    Stale { cached: Timestamp, current: Timestamp },
    #[error("cache stride {found} doesn't match mesh stride {expected}")]
    LayoutMismatch { found: u32, expected: u32 },
    #[error("cache file is truncated")]
    Truncated,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("source path has no file name to derive a cache path from")]
    NoFileName,
    #[error("couldn't write cache file")]
    Io(#[from] io::Error),
}

/// Where the cache for `source` lives: `<source dir>/<cache_dir>/<source file name>.bin`
pub fn cache_path(source: impl AsRef<Path>, cache_dir: &str) -> Option<PathBuf> {
    let source = source.as_ref();
    let mut name = source.file_name()?.to_os_string();
    name.push(".bin");
    let dir = source.parent().unwrap_or(Path::new(""));
    Some(dir.join(cache_dir).join(name))
}

// region Encoding

/// Writes a complete cache file for the given geometry
pub fn write_record<A: AttributeSet>(
    out: &mut impl Write,
    source_mtime: Timestamp,
    bbox: &BoundingBox,
    faces: &[Face<A>],
) -> io::Result<()> {
    let stride = VertexLayout::of::<A>().stride();

    out.write_all(&CACHE_VERSION.to_le_bytes())?;
    out.write_all(&source_mtime.secs.to_le_bytes())?;
    out.write_all(&source_mtime.nanos.to_le_bytes())?;
    for v in bbox.min().to_array().into_iter().chain(bbox.max().to_array()) {
        out.write_all(&v.to_le_bytes())?;
    }
    out.write_all(&stride.to_le_bytes())?;

    let mut buf = Vec::with_capacity(faces.len() * Face::<A>::byte_size());
    faces.iter().for_each(|f| f.write_bytes(&mut buf));
    out.write_all(&buf)
}

/// Reads back a file written by [write_record], checking the version and layout (but not the mtime)
pub fn read_record<A: AttributeSet>(bytes: &[u8]) -> Result<CacheRecord<A>, CacheMiss> {
    let mut reader = Reader(bytes);

    let version = reader.u32()?;
    if version != CACHE_VERSION {
        return Err(CacheMiss::VersionMismatch {
            found: version,
            expected: CACHE_VERSION,
        });
    }
    if bytes.len() < HEADER_SIZE {
        return Err(CacheMiss::Truncated);
    }

    let secs = reader.i64()?;
    let nanos = reader.u32()?;
    let mut corner = || -> Result<Vector3, CacheMiss> { Ok(Vector3::new(reader.f32()?, reader.f32()?, reader.f32()?)) };
    let (min, max) = (corner()?, corner()?);
    let stride = reader.u32()?;

    let expected = VertexLayout::of::<A>().stride();
    if stride != expected {
        return Err(CacheMiss::LayoutMismatch { found: stride, expected });
    }

    let face_size = Face::<A>::byte_size();
    let blob = reader.0;
    if blob.len() % face_size != 0 {
        return Err(CacheMiss::Truncated);
    }

    Ok(CacheRecord {
        version,
        source_mtime: Timestamp { secs, nanos },
        // Not `BoundingBox::new`, which would reorder the corners of an empty box
        bbox: bytemuck::cast([min, max]),
        stride,
        faces: blob.chunks_exact(face_size).map(Face::read_bytes).collect(),
    })
}

/// Little-endian cursor over the header
struct Reader<'a>(&'a [u8]);

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CacheMiss> {
        let (head, rest) = self.0.split_first_chunk::<N>().ok_or(CacheMiss::Truncated)?;
        self.0 = rest;
        Ok(*head)
    }

    fn u32(&mut self) -> Result<u32, CacheMiss> { self.take().map(u32::from_le_bytes) }

    fn i64(&mut self) -> Result<i64, CacheMiss> { self.take().map(i64::from_le_bytes) }

    fn f32(&mut self) -> Result<f32, CacheMiss> { self.take().map(f32::from_le_bytes) }
}

// endregion Encoding

// region Loading

/// Loads the cache for `source`, if there is one and it is still valid
pub fn try_load<A: AttributeSet>(source: impl AsRef<Path>, cache_dir: &str) -> Result<CacheRecord<A>, CacheMiss> {
    let source = source.as_ref();
    let path = cache_path(source, cache_dir).ok_or(CacheMiss::Missing)?;

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(CacheMiss::Missing),
        Err(err) => return Err(err.into()),
    };
    let current = Timestamp::of_file(source)?;
    let record = read_record::<A>(&bytes)?;

    if record.source_mtime != current {
        return Err(CacheMiss::Stale {
            cached: record.source_mtime,
            current,
        });
    }

    debug!(target: CACHE, ?path, faces = record.faces.len(), "loaded mesh from cache");
    Ok(record)
}

/// Writes the cache for `source`, stamped with `source_mtime`: the mtime the source had when it was read
pub fn save<A: AttributeSet>(
    source: impl AsRef<Path>,
    cache_dir: &str,
    source_mtime: Timestamp,
    bbox: &BoundingBox,
    faces: &[Face<A>],
) -> Result<PathBuf, CacheError> {
    let path = cache_path(source.as_ref(), cache_dir).ok_or(CacheError::NoFileName)?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = io::BufWriter::new(std::fs::File::create(&path)?);
    write_record(&mut file, source_mtime, bbox, faces)?;
    file.flush()?;

    trace!(target: CACHE, ?path, faces = faces.len(), "saved mesh cache");
    Ok(path)
}

// endregion Loading
