//! Calibration asset embedding and loading.

use crate::CalibrationTable;
use rust_embed::RustEmbed;
use thiserror::Error;

/// Embeds the calibration tables from the assets/ directory into the binary.
/// In debug mode, assets are loaded from the filesystem for faster iteration.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

const CALIBRATION_RON_PATH: &str = "calibration.ron";

/// Errors that can occur when loading calibration data.
#[derive(Error, Debug)]
pub enum CalibrationLoadError {
    #[error("calibration.ron not found in embedded assets")]
    CalibrationNotFound,
    #[error("failed to read calibration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid UTF-8 in calibration data: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("failed to parse calibration data: {0}")]
    ParseError(#[from] ron::de::SpannedError),
}

/// Loads the calibration table shipped with the crate.
pub fn load_calibration() -> Result<CalibrationTable, CalibrationLoadError> {
    let file = Assets::get(CALIBRATION_RON_PATH).ok_or(CalibrationLoadError::CalibrationNotFound)?;
    let ron_string = std::str::from_utf8(&file.data)?;
    Ok(CalibrationTable::from_ron_str(ron_string)?)
}

/// Loads a calibration table from a RON file on disk.
pub fn load_calibration_file(
    path: &std::path::Path,
) -> Result<CalibrationTable, CalibrationLoadError> {
    let ron_string = std::fs::read_to_string(path)?;
    Ok(CalibrationTable::from_ron_str(&ron_string)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_calibration_parses() {
        let table = load_calibration().expect("embedded calibration loads");

        assert!(!table.is_empty());
        assert!(table.is_outdoors("Town"));
        assert!(!table.is_outdoors("ScienceHouse"));
        assert!(table.landmarks("Town").is_some_and(|marks| marks.len() > 1));
    }
}
