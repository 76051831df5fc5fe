//! `*.canvas` suspend files: the raw codec bytes of a single canvas.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::codec::AsCanvas;
use crate::dna::Canvas;
use crate::environment::Environment;
use crate::error::Result;

/// write `canvas` as raw bytes, creating parent directories
pub fn save_suspended(path: impl AsRef<Path>, canvas: &Canvas) -> Result<()> {
    profiling::scope!("save_suspended");
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, canvas.as_bytes())?;
    Ok(())
}

pub fn load_suspended(path: impl AsRef<Path>, env: &Arc<Environment>) -> Result<Canvas> {
    profiling::scope!("load_suspended");
    let bytes = fs::read(path)?;
    bytes.as_slice().as_canvas(env)
}

/// `None` when no file exists; a present but malformed file is an error
pub fn load_if_exists(path: impl AsRef<Path>, env: &Arc<Environment>) -> Result<Option<Canvas>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    load_suspended(path, env).map(Some)
}
