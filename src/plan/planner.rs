use crate::foundation::core::{Patch, PixelPos, ScreenGeometry};
use crate::foundation::error::{TilecastError, TilecastResult};

/// Tile dimensions used by [`plan_patches`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PatchSize {
    /// Tile width in pixels.
    pub width: u32,
    /// Tile height in pixels.
    pub height: u32,
}

impl PatchSize {
    /// Square tiles of `n × n` pixels.
    pub const fn square(n: u32) -> Self {
        Self {
            width: n,
            height: n,
        }
    }

    /// One full-width strip per row.
    pub const fn rows(width: u32) -> Self {
        Self { width, height: 1 }
    }

    fn validate(&self) -> TilecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TilecastError::validation("patch size must be > 0"));
        }
        Ok(())
    }
}

impl From<u32> for PatchSize {
    fn from(n: u32) -> Self {
        Self::square(n)
    }
}

/// Partition `geometry` into row-major tiles of `size`.
///
/// Tile edges sit at multiples of the tile size; the last tile of each row and column is clipped
/// to `width - 1` / `height - 1`. The result covers every pixel exactly once.
pub fn plan_patches(
    geometry: &ScreenGeometry,
    size: impl Into<PatchSize>,
) -> TilecastResult<Vec<Patch>> {
    let size = size.into();
    geometry.validate()?;
    size.validate()?;

    let cols = geometry.width.div_ceil(size.width) as usize;
    let rows = geometry.height.div_ceil(size.height) as usize;
    let mut out = Vec::with_capacity(cols * rows);

    let mut start_y = 0u32;
    while start_y < geometry.height {
        let end_y = clip_end(start_y, size.height, geometry.height);
        let mut start_x = 0u32;
        while start_x < geometry.width {
            let end_x = clip_end(start_x, size.width, geometry.width);
            out.push(Patch {
                start: PixelPos::new(start_x, start_y),
                end: PixelPos::new(end_x, end_y),
            });
            start_x = end_x + 1;
        }
        start_y = end_y + 1;
    }

    tracing::debug!(
        width = geometry.width,
        height = geometry.height,
        patch_w = size.width,
        patch_h = size.height,
        patches = out.len(),
        "planned patches"
    );
    Ok(out)
}

fn clip_end(start: u32, step: u32, extent: u32) -> u32 {
    // saturating so huge tile sizes near u32::MAX still clip instead of wrapping
    start.saturating_add(step).min(extent) - 1
}

#[cfg(test)]
#[path = "../../tests/unit/plan/planner.rs"]
mod tests;
