//! CPU temperature sensor resource.
//!
//! The sensor is a text file exporting the die temperature in
//! millidegrees (e.g. `/sys/class/thermal/thermal_zone0/temp`). The
//! handle is opened once at acquisition and kept for the process
//! lifetime; every refresh rewinds it and re-reads the whole reading.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::ResourceError;

/// CPU temperature sensor backed by a sysfs file.
///
/// Refreshes are self-contained (rewind, read, parse) but share the one
/// open handle, so they serialize on an internal mutex. The lock is held
/// only for the duration of a single refresh.
pub struct ThermalSensor {
    file: Mutex<File>,
    path: PathBuf,
}

impl ThermalSensor {
    /// Open the sensor backing file.
    ///
    /// The caller decides how to treat failures: a missing path disables
    /// the temperature binding, an inaccessible one degrades it.
    ///
    /// # Errors
    /// Returns the underlying I/O error when the file cannot be opened.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current temperature in degrees.
    ///
    /// Rewinds the handle, parses the first floating-point token of the
    /// raw reading (millidegrees) and scales it to degrees.
    ///
    /// # Errors
    /// Returns `ResourceError::Io` when the file cannot be re-read and
    /// `ResourceError::Parse` when the reading is not numeric. A parse
    /// failure is reported to the caller, never fatal.
    pub fn refresh(&self) -> Result<f64, ResourceError> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(0))?;

        let mut raw = String::new();
        file.read_to_string(&mut raw)?;

        let token = raw
            .split_whitespace()
            .next()
            .ok_or_else(|| ResourceError::Parse("empty sensor reading".to_string()))?;
        let millidegrees: f64 = token.parse().map_err(|_| {
            ResourceError::Parse(format!("not a temperature: {token:?}"))
        })?;

        Ok(millidegrees / 1000.0)
    }
}
