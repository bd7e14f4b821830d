//! Shared linear float sample store and its per-patch write views.

mod pixel_buffer;

pub use pixel_buffer::{PatchView, PixelBuffer};
