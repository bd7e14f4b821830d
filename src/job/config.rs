use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::dispatch::DispatchOpts;
use crate::engine::spheres::SphereSceneDesc;
use crate::foundation::core::{SamplingParams, ScreenGeometry};
use crate::foundation::error::{TilecastError, TilecastResult};

/// JSON-facing render configuration consumed by the `tilecast` binary.
///
/// Every field is optional in JSON; missing fields take the defaults below.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Square patch edge in pixels.
    pub patch_size: u32,
    /// Subpixels per axis.
    pub subpixel_count: u32,
    /// Accumulation passes.
    pub iteration_count: u32,
    /// Worker threads; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Dispatch on a worker pool when `true`.
    pub parallel: bool,
    /// Destination image.
    pub output: PathBuf,
    /// Scene rendered by the built-in sphere engine.
    pub scene: SphereSceneDesc,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            patch_size: 8,
            subpixel_count: 1,
            iteration_count: 1,
            threads: None,
            parallel: true,
            output: PathBuf::from("render.png"),
            scene: SphereSceneDesc::default(),
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TilecastResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| TilecastError::validation(format!("parse render config JSON: {e}")))?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TilecastResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TilecastError::validation(format!("open render config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every numeric field.
    pub fn validate(&self) -> TilecastResult<()> {
        self.geometry()?;
        self.sampling()?;
        if self.patch_size == 0 {
            return Err(TilecastError::validation("patch_size must be > 0"));
        }
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(TilecastError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }

    /// Frame geometry.
    pub fn geometry(&self) -> TilecastResult<ScreenGeometry> {
        ScreenGeometry::new(self.width, self.height)
    }

    /// Sampling parameters.
    pub fn sampling(&self) -> TilecastResult<SamplingParams> {
        SamplingParams::new(self.subpixel_count, self.iteration_count)
    }

    /// Dispatch options derived from the threading fields.
    pub fn dispatch_opts(&self) -> DispatchOpts {
        DispatchOpts {
            parallel: self.parallel,
            threads: self.threads,
            ..DispatchOpts::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/config.rs"]
mod tests;
