// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/status/temperature.rs
// Version: 1.0.1
//
// This file implements CPU temperature sampling for the XMRig Bridge,
// located in the status subdirectory. Temperature is an external input to
// the status computation; hosts without sensors report None and mining is
// unaffected.
//
// Tree Location:
// - src/status/temperature.rs (CPU temperature sampling)
// - Depends on: sysinfo

use sysinfo::Components;

/// Status degrades to temp-throttle at or above this reading (Celsius)
pub const TEMP_THROTTLE: f32 = 80.0;

/// Status degrades to temp-stop at or above this reading (Celsius)
pub const TEMP_STOP: f32 = 90.0;

/// Labels that mark a sensor as CPU-related. Preferred over whatever else
/// the host exposes (NVMe, ambient, battery).
const CPU_SENSOR_HINTS: [&str; 6] = ["cpu", "core", "package", "tctl", "tdie", "k10temp"];

/// Samples the host's temperature sensors.
pub struct TempSensor {
    components: Components,
}

impl TempSensor {
    pub fn new() -> Self {
        Self {
            components: Components::new_with_refreshed_list(),
        }
    }

    /// Best available CPU temperature reading in Celsius. Prefers CPU-like
    /// sensors, falls back to the hottest of whatever is exposed, and
    /// returns None when the host has no usable sensor at all.
    pub fn sample(&mut self) -> Option<f32> {
        self.components.refresh(true);

        let mut best: Option<f32> = None;
        let mut best_is_cpu = false;
        for component in self.components.list() {
            let Some(reading) = component.temperature() else {
                continue;
            };
            if !reading.is_finite() {
                continue;
            }
            let label = component.label().to_ascii_lowercase();
            let is_cpu = CPU_SENSOR_HINTS.iter().any(|hint| label.contains(hint));
            let better = match best {
                None => true,
                Some(current) => {
                    if is_cpu != best_is_cpu {
                        is_cpu
                    } else {
                        reading > current
                    }
                }
            };
            if better {
                best = Some(reading);
                best_is_cpu = is_cpu;
            }
        }
        best
    }
}

impl Default for TempSensor {
    fn default() -> Self {
        Self::new()
    }
}

// Changelog:
// - v1.0.1 (2025-07-21): Prefer CPU-labelled sensors over the hottest one.
// - v1.0.0 (2025-07-12): Initial sensor sampling.
