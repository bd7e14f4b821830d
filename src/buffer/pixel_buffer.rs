use crate::foundation::core::{CHANNELS, Patch, PixelPos, ScreenGeometry};
use crate::foundation::error::{TilecastError, TilecastResult};

/// Flat RGBA `f32` sample store for one frame.
///
/// Layout is row-major with index `((y * width) + x) * 4 + channel`. Samples start at zero.
/// Workers never touch the buffer directly; they receive disjoint [`PatchView`]s from
/// [`PixelBuffer::patch_views`].
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    geometry: ScreenGeometry,
    samples: Vec<f32>,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer for `geometry`.
    pub fn new(geometry: ScreenGeometry) -> TilecastResult<Self> {
        geometry.validate()?;
        let len = geometry.sample_len()?;
        Ok(Self {
            geometry,
            samples: vec![0.0; len],
        })
    }

    /// Wrap existing samples; `samples.len()` must equal `geometry.sample_len()`.
    pub fn from_samples(geometry: ScreenGeometry, samples: Vec<f32>) -> TilecastResult<Self> {
        geometry.validate()?;
        let expected = geometry.sample_len()?;
        if samples.len() != expected {
            return Err(TilecastError::validation(format!(
                "pixel buffer has {} samples, expected {expected}",
                samples.len()
            )));
        }
        Ok(Self { geometry, samples })
    }

    /// Frame dimensions.
    pub fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    /// Borrow every sample.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the buffer, returning its samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// RGBA samples of pixel `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; CHANNELS]> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        let i = self.geometry.sample_index(x, y);
        self.samples.get(i..i + CHANNELS)?.try_into().ok()
    }

    /// Reset every sample to zero.
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }

    /// Split the buffer into one mutable view per patch.
    ///
    /// Views are returned in the order of `patches`. Each view owns exactly the row segments
    /// covered by its patch, so views can be handed to different threads without locking.
    /// Patches with inverted corners, patches that leave the frame and patches that share a pixel
    /// are rejected.
    pub fn patch_views(&mut self, patches: &[Patch]) -> TilecastResult<Vec<PatchView<'_>>> {
        let g = self.geometry;
        let mut by_row: Vec<Vec<usize>> = vec![Vec::new(); g.height as usize];
        for (i, p) in patches.iter().enumerate() {
            if p.start.x > p.end.x || p.start.y > p.end.y {
                return Err(TilecastError::validation(format!(
                    "patch {p} has start past end"
                )));
            }
            if !p.fits(&g) {
                return Err(TilecastError::validation(format!(
                    "patch {p} exceeds {}x{} frame",
                    g.width, g.height
                )));
            }
            for y in p.rows() {
                by_row[y as usize].push(i);
            }
        }

        let mut views: Vec<PatchView<'_>> = patches
            .iter()
            .map(|p| PatchView {
                patch: *p,
                rows: Vec::with_capacity(p.height() as usize),
            })
            .collect();

        let row_len = (g.width as usize) * CHANNELS;
        for (y, row) in self.samples.chunks_exact_mut(row_len).enumerate() {
            let owners = &mut by_row[y];
            owners.sort_unstable_by_key(|&i| patches[i].start.x);

            let mut rest: &mut [f32] = row;
            let mut cursor = 0usize;
            for &i in owners.iter() {
                let p = &patches[i];
                let start_x = p.start.x as usize;
                if start_x < cursor {
                    return Err(TilecastError::validation(format!(
                        "patch {p} overlaps another patch on row {y}"
                    )));
                }
                let tail = std::mem::take(&mut rest);
                let (_, tail) = tail.split_at_mut((start_x - cursor) * CHANNELS);
                let (segment, tail) = tail.split_at_mut((p.width() as usize) * CHANNELS);
                views[i].rows.push(segment);
                rest = tail;
                cursor = p.end.x as usize + 1;
            }
        }

        debug_assert!(
            views
                .iter()
                .all(|v| v.rows.len() == v.patch.height() as usize)
        );
        Ok(views)
    }
}

/// Exclusive write access to the samples of one patch.
///
/// Coordinates passed to the accessors are absolute frame coordinates; anything outside the
/// patch is rejected rather than written.
#[derive(Debug)]
pub struct PatchView<'a> {
    patch: Patch,
    rows: Vec<&'a mut [f32]>,
}

impl PatchView<'_> {
    /// Bounds of the region this view may write.
    pub fn patch(&self) -> Patch {
        self.patch
    }

    /// Mutable RGBA samples of pixel `(x, y)`, or `None` outside the patch.
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [f32; CHANNELS]> {
        if !self.patch.contains(PixelPos::new(x, y)) {
            return None;
        }
        let row = self.rows.get_mut((y - self.patch.start.y) as usize)?;
        let i = ((x - self.patch.start.x) as usize) * CHANNELS;
        row.get_mut(i..i + CHANNELS)?.try_into().ok()
    }

    /// Read-only RGBA samples of pixel `(x, y)`, or `None` outside the patch.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; CHANNELS]> {
        if !self.patch.contains(PixelPos::new(x, y)) {
            return None;
        }
        let row = self.rows.get((y - self.patch.start.y) as usize)?;
        let i = ((x - self.patch.start.x) as usize) * CHANNELS;
        row.get(i..i + CHANNELS)?.try_into().ok()
    }

    /// Samples of frame row `y` restricted to the patch's columns.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [f32]> {
        if !self.patch.rows().contains(&y) {
            return None;
        }
        self.rows
            .get_mut((y - self.patch.start.y) as usize)
            .map(|r| &mut **r)
    }

    /// Iterate `(y, samples)` for every row of the patch.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = (u32, &mut [f32])> + '_ {
        let start_y = self.patch.start.y;
        self.rows
            .iter_mut()
            .enumerate()
            .map(move |(i, r)| (start_y + i as u32, &mut **r))
    }

    /// Set every pixel of the patch to `rgba`.
    pub fn fill(&mut self, rgba: [f32; CHANNELS]) {
        for row in &mut self.rows {
            for px in row.chunks_exact_mut(CHANNELS) {
                px.copy_from_slice(&rgba);
            }
        }
    }

    /// Multiply every sample of the patch by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for row in &mut self.rows {
            for s in row.iter_mut() {
                *s *= factor;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/pixel_buffer.rs"]
mod tests;
