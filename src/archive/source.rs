use crate::error::Result;
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, GZIP_EXTENSION};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == GZIP_EXTENSION)
}

/// Open a source file for reading, decompressing `.gz` files on the fly.
pub fn open_source(path: &Path) -> Result<Box<dyn Read + Send>> {
    let file = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, File::open(path)?);
    if is_gzip(path) {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Decompress a `.gz` archive to `out_path`. An existing output is kept unless `force` is set.
///
/// Returns whether the file was written.
pub fn extract_gzip(in_path: &Path, out_path: &Path, force: bool) -> Result<bool> {
    if out_path.exists() && !force {
        debug!("{} already extracted", out_path.display());
        return Ok(false);
    }

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut decoder = open_source(in_path)?;
    let mut writer = BufWriter::new(File::create(out_path)?);
    std::io::copy(&mut decoder, &mut writer)?;
    writer.flush()?;

    Ok(true)
}
