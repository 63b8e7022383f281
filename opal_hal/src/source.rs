//! `DataSource` trait and the per-resource bindings.
//!
//! A data source is the read/write callback pair bound to a
//! server-visible variable, backing it with live computed or
//! hardware-derived values instead of a static stored value. One
//! implementation exists per hardware resource kind; selection happens
//! once at address-space construction, not per request.
//!
//! None of the bindings serve partitioned values: a request carrying a
//! sub-range is answered with `BadIndexRangeInvalid` on the envelope and
//! the hardware is not touched.

use std::sync::Arc;
use std::time::SystemTime;

use opal_common::status::StatusCode;
use opal_common::value::{DataValue, ReadRequest, Value, WriteRequest};
use tracing::warn;

use crate::clock::SystemClock;
use crate::error::ResourceError;
use crate::led::LedActuator;
use crate::thermal::ThermalSensor;

/// Read/write contract of a variable backed by live data.
///
/// Dispatched into synchronously by the hosting request loop, possibly
/// from overlapping connections.
pub trait DataSource: Send + Sync {
    /// Produce a fresh value.
    ///
    /// Always returns a well-formed envelope; rejections and resource
    /// failures travel as the envelope status. The source timestamp is
    /// populated only when the request asks for it.
    fn read(&self, req: &ReadRequest) -> DataValue;

    /// Apply a value to the underlying resource.
    ///
    /// Only writable sources override this; the address space rejects
    /// writes upstream for the rest.
    fn write(&self, _req: &WriteRequest) -> StatusCode {
        StatusCode::BadNotWritable
    }

    /// Whether the source accepts writes. Default: read-only.
    fn writable(&self) -> bool {
        false
    }
}

/// Map a refresh failure onto the envelope status taxonomy.
fn refresh_status(err: &ResourceError) -> StatusCode {
    match err {
        ResourceError::OutOfMemory => StatusCode::BadOutOfMemory,
        ResourceError::Io { .. } | ResourceError::Parse(_) => StatusCode::BadInternalError,
    }
}

/// Read-only binding serving the current time.
#[derive(Debug, Default)]
pub struct ClockSource {
    clock: SystemClock,
}

impl ClockSource {
    /// Bind the system clock.
    pub fn new() -> Self {
        Self {
            clock: SystemClock::new(),
        }
    }
}

impl DataSource for ClockSource {
    fn read(&self, req: &ReadRequest) -> DataValue {
        if req.range.is_some() {
            return DataValue::rejected(StatusCode::BadIndexRangeInvalid);
        }
        let now = match self.clock.refresh() {
            Ok(now) => now,
            Err(e) => return DataValue::rejected(refresh_status(&e)),
        };
        let mut dv = DataValue::new(Value::DateTime(now));
        if req.wants_source_timestamp {
            // The value is its own sample time.
            dv = dv.with_source_timestamp(now);
        }
        dv
    }
}

/// Read-only binding serving the CPU temperature in degrees.
pub struct TemperatureSource {
    sensor: ThermalSensor,
}

impl TemperatureSource {
    /// Bind an opened temperature sensor.
    pub fn new(sensor: ThermalSensor) -> Self {
        Self { sensor }
    }
}

impl DataSource for TemperatureSource {
    fn read(&self, req: &ReadRequest) -> DataValue {
        if req.range.is_some() {
            return DataValue::rejected(StatusCode::BadIndexRangeInvalid);
        }
        let degrees = match self.sensor.refresh() {
            Ok(degrees) => degrees,
            Err(e) => {
                warn!(path = %self.sensor.path().display(), "temperature read failed: {e}");
                return DataValue::rejected(refresh_status(&e));
            }
        };
        let mut dv = DataValue::new(Value::Double(degrees));
        if req.wants_source_timestamp {
            dv = dv.with_source_timestamp(SystemTime::now());
        }
        dv
    }
}

/// Read-write binding over the status LED.
pub struct LedSource {
    actuator: Arc<LedActuator>,
}

impl LedSource {
    /// Bind an acquired LED actuator. The actuator is shared with the
    /// lifecycle manager, which releases it at shutdown.
    pub fn new(actuator: Arc<LedActuator>) -> Self {
        Self { actuator }
    }
}

impl DataSource for LedSource {
    fn read(&self, req: &ReadRequest) -> DataValue {
        if req.range.is_some() {
            return DataValue::rejected(StatusCode::BadIndexRangeInvalid);
        }
        let mut dv = DataValue::new(Value::Boolean(self.actuator.status()));
        if req.wants_source_timestamp {
            dv = dv.with_source_timestamp(SystemTime::now());
        }
        dv
    }

    fn write(&self, req: &WriteRequest) -> StatusCode {
        if req.range.is_some() {
            return StatusCode::BadIndexRangeInvalid;
        }
        let on = match &req.value {
            // Structurally valid but empty: accepted as a no-op.
            None => return StatusCode::Good,
            Some(Value::Boolean(on)) => *on,
            Some(other) => {
                warn!(kind = other.kind(), "LED write with non-boolean payload");
                return StatusCode::BadTypeMismatch;
            }
        };
        if let Err(e) = self.actuator.set_status(on) {
            // State is updated; only the hardware write degraded.
            warn!("LED persist failed: {e}");
        }
        StatusCode::Good
    }

    fn writable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_common::value::{NodeId, NumericRange};
    use std::fs;
    use std::io::Write as _;
    use tempfile::{NamedTempFile, TempDir};

    fn read_req(ranged: bool, wants_ts: bool) -> ReadRequest {
        let mut req = ReadRequest::new(NodeId::numeric(1, 1));
        if ranged {
            req = req.with_range(NumericRange::new(0, 3));
        }
        if wants_ts {
            req = req.with_source_timestamp();
        }
        req
    }

    fn led_source() -> (TempDir, Arc<LedActuator>, LedSource) {
        let dir = TempDir::new().unwrap();
        let trigger = dir.path().join("trigger");
        let brightness = dir.path().join("brightness");
        fs::write(&trigger, "mmc0").unwrap();
        fs::write(&brightness, "0").unwrap();
        let actuator = Arc::new(LedActuator::acquire(&trigger, &brightness, "mmc0").unwrap());
        let source = LedSource::new(Arc::clone(&actuator));
        (dir, actuator, source)
    }

    #[test]
    fn clock_read_returns_datetime() {
        let source = ClockSource::new();
        let dv = source.read(&read_req(false, false));
        assert_eq!(dv.status, StatusCode::Good);
        assert!(matches!(dv.value, Some(Value::DateTime(_))));
        assert!(dv.source_timestamp.is_none());
    }

    #[test]
    fn clock_timestamp_only_when_requested() {
        let source = ClockSource::new();
        let dv = source.read(&read_req(false, true));
        assert!(dv.source_timestamp.is_some());

        let dv = source.read(&read_req(false, false));
        assert!(dv.source_timestamp.is_none());
    }

    #[test]
    fn ranged_clock_read_rejected() {
        let source = ClockSource::new();
        let dv = source.read(&read_req(true, true));
        assert_eq!(dv.status, StatusCode::BadIndexRangeInvalid);
        assert!(dv.value.is_none());
        assert!(dv.source_timestamp.is_none());
    }

    #[test]
    fn temperature_read_scales_millidegrees() {
        let mut backing = NamedTempFile::new().unwrap();
        backing.write_all(b"36500\n").unwrap();
        backing.flush().unwrap();
        let source = TemperatureSource::new(ThermalSensor::open(backing.path()).unwrap());

        let dv = source.read(&read_req(false, false));
        assert_eq!(dv.status, StatusCode::Good);
        match dv.value {
            Some(Value::Double(t)) => assert!((t - 36.5).abs() < f64::EPSILON),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn corrupt_temperature_is_status_not_panic() {
        let mut backing = NamedTempFile::new().unwrap();
        backing.write_all(b"garbage\n").unwrap();
        backing.flush().unwrap();
        let source = TemperatureSource::new(ThermalSensor::open(backing.path()).unwrap());

        let dv = source.read(&read_req(false, false));
        assert_eq!(dv.status, StatusCode::BadInternalError);
        assert!(dv.value.is_none());
    }

    #[test]
    fn ranged_temperature_read_skips_hardware() {
        // Backing file holds garbage: touching the sensor would produce
        // BadInternalError, so BadIndexRangeInvalid proves the range
        // check fired before any hardware access.
        let mut backing = NamedTempFile::new().unwrap();
        backing.write_all(b"garbage\n").unwrap();
        backing.flush().unwrap();
        let source = TemperatureSource::new(ThermalSensor::open(backing.path()).unwrap());

        let dv = source.read(&read_req(true, false));
        assert_eq!(dv.status, StatusCode::BadIndexRangeInvalid);
    }

    #[test]
    fn led_read_reflects_status() {
        let (_dir, actuator, source) = led_source();
        actuator.set_status(true).unwrap();

        let dv = source.read(&read_req(false, false));
        assert_eq!(dv.status, StatusCode::Good);
        assert!(matches!(dv.value, Some(Value::Boolean(true))));
        assert!(dv.source_timestamp.is_none());
    }

    #[test]
    fn led_write_applies_value() {
        let (_dir, actuator, source) = led_source();
        let req = WriteRequest::new(NodeId::numeric(1, 3), Value::Boolean(true));
        assert_eq!(source.write(&req), StatusCode::Good);
        assert!(actuator.status());
    }

    #[test]
    fn ranged_led_write_rejected() {
        let (_dir, actuator, source) = led_source();
        let req = WriteRequest::new(NodeId::numeric(1, 3), Value::Boolean(true))
            .with_range(NumericRange::new(0, 1));
        assert_eq!(source.write(&req), StatusCode::BadIndexRangeInvalid);
        assert!(!actuator.status());
    }

    #[test]
    fn empty_led_write_is_noop_success() {
        let (_dir, actuator, source) = led_source();
        actuator.set_status(true).unwrap();

        let req = WriteRequest::empty(NodeId::numeric(1, 3));
        assert_eq!(source.write(&req), StatusCode::Good);
        assert!(actuator.status(), "state must be unchanged");
    }

    #[test]
    fn non_boolean_led_write_is_type_mismatch() {
        let (_dir, actuator, source) = led_source();
        let req = WriteRequest::new(NodeId::numeric(1, 3), Value::Int32(1));
        assert_eq!(source.write(&req), StatusCode::BadTypeMismatch);
        assert!(!actuator.status());
    }

    #[test]
    fn clock_and_temperature_are_read_only() {
        let clock = ClockSource::new();
        assert!(!clock.writable());

        let mut backing = NamedTempFile::new().unwrap();
        backing.write_all(b"1000\n").unwrap();
        backing.flush().unwrap();
        let temp = TemperatureSource::new(ThermalSensor::open(backing.path()).unwrap());
        assert!(!temp.writable());

        let req = WriteRequest::new(NodeId::numeric(1, 1), Value::Boolean(true));
        assert_eq!(clock.write(&req), StatusCode::BadNotWritable);
        assert_eq!(temp.write(&req), StatusCode::BadNotWritable);
    }
}
