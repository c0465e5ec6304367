use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$OFXKIT_HOME`, or `~/.ofxkit` when unset.
pub fn ofxkit_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("OFXKIT_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ofxkit"))
}

pub fn ensure_ofxkit_home() -> Result<PathBuf> {
    let dir = ofxkit_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
