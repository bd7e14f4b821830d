//! Conversion of the finished float buffer into a persisted 8-bit image.

mod image_out;

pub use image_out::{assemble_image, ensure_parent_dir, write_image};
