use crate::store::error::StoreError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const STORE_DIR_NAME: &str = "will_it_rain_models";

pub fn get_store_dir() -> Result<PathBuf, StoreError> {
    dirs::cache_dir()
        .map(|p| p.join(STORE_DIR_NAME))
        .ok_or(StoreError::DirResolution)
}

pub fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match std::fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating model directory: {}", path.display());
            std::fs::create_dir_all(path)
        }
        Err(e) => Err(e),
    }
}
