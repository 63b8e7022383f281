//! Status LED actuator.
//!
//! The LED is driven through two sysfs files: a trigger file selecting
//! the kernel driver ("none" arms manual control) and a brightness file
//! taking "0"/"1". Acquisition arms manual mode and initializes the LED
//! to a known off state; release hands the LED back to the kernel by
//! restoring the default trigger before the handles close.
//!
//! The in-memory status and both file handles live behind one
//! reader/writer lock. Writes hold the exclusive lock for the minimum
//! critical section (update the status cell, then persist); reads take
//! the shared lock, so they stay concurrent with each other while
//! excluding a writer mid-update.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::ResourceError;

/// Trigger mode that hands brightness control to userspace.
const MANUAL_TRIGGER: &str = "none";

/// Shared actuator state. Mutated exclusively under the write lock.
struct LedInner {
    /// Last status applied. The physical file matches this before any
    /// `set_status` call returns.
    status: bool,
    trigger: File,
    brightness: File,
}

/// Status LED actuator backed by sysfs trigger and brightness files.
pub struct LedActuator {
    inner: RwLock<LedInner>,
    /// Whether manual mode was successfully armed at acquisition.
    armed: bool,
    /// Trigger mode restored at release.
    default_trigger: String,
    released: AtomicBool,
}

impl LedActuator {
    /// Acquire the LED: open both backing files, arm manual mode and
    /// initialize the LED to off.
    ///
    /// The caller probes for path existence first; reaching this call
    /// with inaccessible files is a degradation, not an absence.
    ///
    /// # Errors
    /// Returns the underlying I/O error when either file cannot be
    /// opened or the initial writes fail.
    pub fn acquire(
        trigger_path: &Path,
        brightness_path: &Path,
        default_trigger: &str,
    ) -> std::io::Result<Self> {
        let mut trigger = OpenOptions::new().write(true).open(trigger_path)?;
        let mut brightness = OpenOptions::new().write(true).open(brightness_path)?;

        // Hand brightness control to userspace.
        trigger.write_all(MANUAL_TRIGGER.as_bytes())?;
        trigger.flush()?;

        // Known initial state: LED off, in memory and in hardware.
        brightness.write_all(b"0")?;
        brightness.flush()?;

        info!("LED acquired, manual trigger armed");

        Ok(Self {
            inner: RwLock::new(LedInner {
                status: false,
                trigger,
                brightness,
            }),
            armed: true,
            default_trigger: default_trigger.to_string(),
            released: AtomicBool::new(false),
        })
    }

    /// Current LED status.
    ///
    /// Takes the shared lock: concurrent with other reads, excluded
    /// against a write in progress.
    pub fn status(&self) -> bool {
        self.inner.read().status
    }

    /// Set the LED status and persist it to hardware.
    ///
    /// Holds the exclusive lock across the in-memory update and the file
    /// writes, so two concurrent calls can never interleave: the file's
    /// final content always equals the status cell of whichever call
    /// locked last.
    ///
    /// # Errors
    /// Returns `ResourceError::Io` when the hardware write fails. The
    /// in-memory status is updated regardless, so a later read reflects
    /// the requested state.
    pub fn set_status(&self, on: bool) -> Result<(), ResourceError> {
        let mut inner = self.inner.write();
        inner.status = on;
        Self::persist_locked(&mut inner)
    }

    /// Write the current status out to hardware. Caller holds the lock.
    fn persist_locked(inner: &mut LedInner) -> Result<(), ResourceError> {
        inner.trigger.seek(SeekFrom::Start(0))?;
        inner.brightness.seek(SeekFrom::Start(0))?;
        let byte: &[u8] = if inner.status { b"1" } else { b"0" };
        inner.brightness.write_all(byte)?;
        inner.brightness.flush()?;
        Ok(())
    }

    /// Release the LED: restore the default trigger mode, then let the
    /// handles close.
    ///
    /// Idempotent; only the first call performs the restore. The trigger
    /// is restored only if manual mode was armed at acquisition.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        if !self.armed {
            return;
        }

        let mut inner = self.inner.write();
        match restore_trigger(&mut inner.trigger, &self.default_trigger) {
            Ok(()) => info!(trigger = %self.default_trigger, "LED trigger restored"),
            Err(e) => warn!("failed to restore LED trigger: {e}"),
        }
    }

    /// Whether `release` has already run.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Put the trigger back into the given mode.
fn restore_trigger(trigger: &mut File, mode: &str) -> std::io::Result<()> {
    trigger.seek(SeekFrom::Start(0))?;
    trigger.write_all(mode.as_bytes())?;
    trigger.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn led_files(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
        let trigger = dir.path().join("trigger");
        let brightness = dir.path().join("brightness");
        fs::write(&trigger, "mmc0").unwrap();
        fs::write(&brightness, "0").unwrap();
        (trigger, brightness)
    }

    #[test]
    fn acquire_arms_manual_mode_and_turns_off() {
        let dir = TempDir::new().unwrap();
        let (trigger, brightness) = led_files(&dir);

        let led = LedActuator::acquire(&trigger, &brightness, "mmc0").unwrap();
        assert!(!led.status());
        assert!(fs::read_to_string(&trigger).unwrap().starts_with("none"));
        assert_eq!(fs::read_to_string(&brightness).unwrap(), "0");
    }

    #[test]
    fn set_status_persists_before_returning() {
        let dir = TempDir::new().unwrap();
        let (trigger, brightness) = led_files(&dir);
        let led = LedActuator::acquire(&trigger, &brightness, "mmc0").unwrap();

        led.set_status(true).unwrap();
        assert_eq!(fs::read_to_string(&brightness).unwrap(), "1");
        assert!(led.status());

        led.set_status(false).unwrap();
        assert_eq!(fs::read_to_string(&brightness).unwrap(), "0");
        assert!(!led.status());
    }

    #[test]
    fn concurrent_writes_never_tear() {
        let dir = TempDir::new().unwrap();
        let (trigger, brightness) = led_files(&dir);
        let led = Arc::new(LedActuator::acquire(&trigger, &brightness, "mmc0").unwrap());

        let mut handles = Vec::new();
        for on in [true, false] {
            let led = Arc::clone(&led);
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    led.set_status(on).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        // The file holds exactly one byte and it matches whichever
        // in-memory update happened last under the lock.
        let content = fs::read_to_string(&brightness).unwrap();
        let expected = if led.status() { "1" } else { "0" };
        assert_eq!(content, expected);
    }

    #[test]
    fn release_restores_default_trigger_once() {
        let dir = TempDir::new().unwrap();
        let (trigger, brightness) = led_files(&dir);
        let led = LedActuator::acquire(&trigger, &brightness, "mmc0").unwrap();
        assert!(fs::read_to_string(&trigger).unwrap().starts_with("none"));

        led.release();
        assert!(led.is_released());
        assert!(fs::read_to_string(&trigger).unwrap().starts_with("mmc0"));

        // Second release is a no-op.
        led.release();
        assert!(fs::read_to_string(&trigger).unwrap().starts_with("mmc0"));
    }

    #[test]
    fn acquire_fails_on_missing_files() {
        let dir = TempDir::new().unwrap();
        let trigger = dir.path().join("no_trigger");
        let brightness = dir.path().join("no_brightness");
        assert!(LedActuator::acquire(&trigger, &brightness, "mmc0").is_err());
    }
}
