use std::fmt;

use crate::foundation::error::{TilecastError, TilecastResult};

/// Number of `f32` channels stored per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Unsigned pixel coordinate in frame space.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct PixelPos {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl PixelPos {
    /// Build a coordinate.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for PixelPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScreenGeometry {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ScreenGeometry {
    /// Create a validated geometry with both dimensions `> 0`.
    pub fn new(width: u32, height: u32) -> TilecastResult<Self> {
        let g = Self { width, height };
        g.validate()?;
        Ok(g)
    }

    /// Check that both dimensions are positive and the sample count fits in memory indexing.
    pub fn validate(&self) -> TilecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TilecastError::validation(
                "screen width/height must be non-zero",
            ));
        }
        self.sample_len().map(|_| ())
    }

    /// Pixel count.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Length of the flat RGBA `f32` sample buffer.
    pub fn sample_len(&self) -> TilecastResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| TilecastError::validation("screen sample count overflows usize"))
    }

    /// Flat index of channel 0 for pixel `(x, y)`.
    pub fn sample_index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS
    }

    /// The single patch covering the whole frame.
    pub fn full_patch(&self) -> Patch {
        Patch {
            start: PixelPos::new(0, 0),
            end: PixelPos::new(self.width - 1, self.height - 1),
        }
    }
}

/// Inclusive rectangular region of the frame, dispatched as one unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Patch {
    /// Inclusive top-left corner.
    pub start: PixelPos,
    /// Inclusive bottom-right corner.
    pub end: PixelPos,
}

impl Patch {
    /// Create a patch from inclusive corners; `start` must not exceed `end` on either axis.
    pub fn new(start: PixelPos, end: PixelPos) -> TilecastResult<Self> {
        if start.x > end.x || start.y > end.y {
            return Err(TilecastError::validation(format!(
                "patch start {start} must be <= end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.end.x - self.start.x + 1
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.end.y - self.start.y + 1
    }

    /// Pixels covered.
    pub fn pixel_count(&self) -> usize {
        (self.width() as usize) * (self.height() as usize)
    }

    /// Return `true` when `pos` lies inside the patch.
    pub fn contains(&self, pos: PixelPos) -> bool {
        self.start.x <= pos.x && pos.x <= self.end.x && self.start.y <= pos.y && pos.y <= self.end.y
    }

    /// Return `true` when both corners lie inside `geometry`.
    pub fn fits(&self, geometry: &ScreenGeometry) -> bool {
        self.end.x < geometry.width && self.end.y < geometry.height
    }

    /// Return `true` when the two patches share at least one pixel.
    pub fn overlaps(&self, other: &Patch) -> bool {
        self.start.x <= other.end.x
            && other.start.x <= self.end.x
            && self.start.y <= other.end.y
            && other.start.y <= self.end.y
    }

    /// Row indices covered.
    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.start.y..=self.end.y
    }

    /// Column indices covered.
    pub fn cols(&self) -> std::ops::RangeInclusive<u32> {
        self.start.x..=self.end.x
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Sampling density handed opaquely to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SamplingParams {
    /// Subpixels per axis; each pixel takes `subpixel_count²` samples per iteration.
    pub subpixel_count: u32,
    /// Accumulation passes averaged into the final value.
    pub iteration_count: u32,
}

impl SamplingParams {
    /// Create validated sampling parameters.
    pub fn new(subpixel_count: u32, iteration_count: u32) -> TilecastResult<Self> {
        let p = Self {
            subpixel_count,
            iteration_count,
        };
        p.validate()?;
        Ok(p)
    }

    /// Check both counts are positive.
    pub fn validate(&self) -> TilecastResult<()> {
        if self.subpixel_count == 0 {
            return Err(TilecastError::validation("subpixel_count must be > 0"));
        }
        if self.iteration_count == 0 {
            return Err(TilecastError::validation("iteration_count must be > 0"));
        }
        Ok(())
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            subpixel_count: 1,
            iteration_count: 1,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
