//! Hardware probing and address-space population.
//!
//! Sequences the node registrations that give the server its shape: a
//! hardware folder with the clock, temperature and LED variables, plus
//! a static demo variable. Each hardware binding is created only if its
//! backing path is accessible; absence disables the binding with an
//! informational log, an inaccessible path degrades it with a warning.

use std::sync::Arc;

use opal_common::config::ServerConfig;
use opal_common::value::{NodeId, Value};
use opal_hal::led::LedActuator;
use opal_hal::source::{ClockSource, LedSource, TemperatureSource};
use opal_hal::thermal::ThermalSensor;
use tracing::{info, warn};

use crate::address_space::{AddressSpace, AddressSpaceError};

/// Hardware acquired while populating the address space.
///
/// Handed to the lifecycle manager, which owns teardown. Each field is
/// individually optional: a missing resource means the acquisition was
/// skipped or degraded, never that teardown may assume it happened.
pub struct AcquiredHardware {
    /// The LED actuator, shared with its binding. Present only when the
    /// backing files were accessible and manual mode was armed.
    pub led: Option<Arc<LedActuator>>,
    /// Node serving the current time. Always registered.
    pub clock_node: NodeId,
    /// Node serving the CPU temperature, if the sensor was acquired.
    pub temperature_node: Option<NodeId>,
    /// Node serving the LED status, if the actuator was acquired.
    pub led_node: Option<NodeId>,
}

/// Probe the hardware and populate the address space.
///
/// Registration order is also acquisition order: clock, temperature
/// sensor, LED. Teardown runs in reverse.
///
/// # Errors
/// Returns an error only for registration conflicts; hardware
/// acquisition failures degrade the address space instead.
pub fn populate(
    space: &mut AddressSpace,
    config: &ServerConfig,
) -> Result<AcquiredHardware, AddressSpaceError> {
    let root = space.objects_root();
    let hardware = space.add_object_node(None, &root, "Hardware")?;

    // The clock has no backing file; it is always available.
    let clock_node =
        space.add_data_source_node(None, &hardware, "current time", Box::new(ClockSource::new()))?;

    let temperature_node = match ThermalSensor::open(&config.hardware.thermal_zone) {
        Ok(sensor) => {
            let node = space.add_data_source_node(
                None,
                &hardware,
                "cpu temperature",
                Box::new(TemperatureSource::new(sensor)),
            )?;
            info!(path = %config.hardware.thermal_zone.display(), "temperature binding registered");
            Some(node)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(
                path = %config.hardware.thermal_zone.display(),
                "no temperature sensor, binding disabled"
            );
            None
        }
        Err(e) => {
            warn!(
                path = %config.hardware.thermal_zone.display(),
                "temperature sensor inaccessible, binding disabled: {e}"
            );
            None
        }
    };

    let (led, led_node) = if config.hardware.led_trigger.exists()
        || config.hardware.led_brightness.exists()
    {
        match LedActuator::acquire(
            &config.hardware.led_trigger,
            &config.hardware.led_brightness,
            &config.hardware.led_default_trigger,
        ) {
            Ok(actuator) => {
                let actuator = Arc::new(actuator);
                let node = space.add_data_source_node(
                    None,
                    &hardware,
                    "status LED",
                    Box::new(LedSource::new(Arc::clone(&actuator))),
                )?;
                (Some(actuator), Some(node))
            }
            Err(e) => {
                warn!(
                    "LED files exist, but are not accessible \
                     (try running the server with elevated privileges): {e}"
                );
                (None, None)
            }
        }
    } else {
        info!("no status LED, binding disabled");
        (None, None)
    };

    space.add_variable_node(
        Some(NodeId::string(1, "the.answer")),
        &root,
        "the answer",
        Value::Int32(42),
    )?;

    info!(nodes = space.len(), "address space populated");

    Ok(AcquiredHardware {
        led,
        clock_node,
        temperature_node,
        led_node,
    })
}
