//! Hub/Sensor adapter — the boundary to physical or simulated hardware.
//!
//! The evaluator treats the hub as a polled data source/sink: Sensor
//! nodes call [`Hub::poll_sensor`] once per tick, Live Output nodes call
//! [`Hub::write_actuator`]. Absent hardware is a *state*, never an error:
//! a disconnected hub answers [`HubReading::NoHub`] and the node shows a
//! degraded display ("(no hub)" / "⚠️ connect device") while the rest of
//! the program keeps ticking.
//!
//! [`DemoHub`] generates deterministic per-sensor waveforms so programs
//! can be authored and tested without hardware.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The sensor channels a hub can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Co2,
    Light,
    Emg,
    SurfacePressure,
    PinReading,
}

impl SensorKind {
    pub fn units(self) -> &'static str {
        match self {
            SensorKind::Temperature => "°C",
            SensorKind::Humidity => "%",
            SensorKind::Co2 => "PPM",
            SensorKind::Light => "lux",
            SensorKind::Emg => "mV",
            SensorKind::SurfacePressure => "psi",
            SensorKind::PinReading => "mV",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SensorKind::Temperature => "Temperature",
            SensorKind::Humidity => "Humidity",
            SensorKind::Co2 => "CO₂",
            SensorKind::Light => "Light",
            SensorKind::Emg => "EMG",
            SensorKind::SurfacePressure => "Surface Pressure",
            SensorKind::PinReading => "Pin Reading",
        }
    }
}

/// The actuator channels a hub can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActuatorChannel {
    Gripper,
    Servo,
    /// Relay index 0
    HeatLamp,
    /// Relay index 1
    Fan,
    /// Relay index 2
    Humidifier,
}

impl ActuatorChannel {
    /// Relay index on a relay-style hub, if this channel is relay-driven.
    pub fn relay_index(self) -> Option<usize> {
        match self {
            ActuatorChannel::HeatLamp => Some(0),
            ActuatorChannel::Fan => Some(1),
            ActuatorChannel::Humidifier => Some(2),
            _ => None,
        }
    }
}

/// Result of a sensor poll or actuator write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HubReading {
    Value(f64),
    /// No hardware reachable — display-only degraded state
    NoHub,
}

impl HubReading {
    /// The numeric value, with NaN standing in for a missing hub.
    pub fn value_or_nan(self) -> f64 {
        match self {
            HubReading::Value(v) => v,
            HubReading::NoHub => f64::NAN,
        }
    }

    pub fn is_no_hub(self) -> bool {
        matches!(self, HubReading::NoHub)
    }
}

/// Polled hardware boundary. A poll must be non-blocking: a slow device
/// driver belongs behind its own thread inside the `Hub` impl, not in
/// the tick.
pub trait Hub: Send {
    /// Whether hardware is currently reachable.
    fn is_connected(&self) -> bool;

    /// Read a sensor channel. `now` is time since engine start.
    fn poll_sensor(&mut self, sensor: SensorKind, now: Duration) -> HubReading;

    /// Drive an actuator channel. Returns `NoHub` when disconnected; the
    /// echoed value otherwise.
    fn write_actuator(&mut self, channel: ActuatorChannel, value: f64) -> HubReading;

    /// Release the hardware connection. Called on engine shutdown.
    fn disconnect(&mut self) {}
}

/// Simulated hub producing plausible per-sensor waveforms.
///
/// Each sensor gets a slow sine around a baseline so demo programs show
/// movement at any tick rate. Actuator writes are retained for display
/// and assertions.
pub struct DemoHub {
    last_written: Vec<(ActuatorChannel, f64)>,
}

impl DemoHub {
    pub fn new() -> Self {
        Self {
            last_written: Vec::new(),
        }
    }

    /// Most recent value written to `channel`, if any.
    pub fn last_written(&self, channel: ActuatorChannel) -> Option<f64> {
        self.last_written
            .iter()
            .rev()
            .find(|(c, _)| *c == channel)
            .map(|&(_, v)| v)
    }

    fn waveform(sensor: SensorKind, t_secs: f64) -> f64 {
        let sine = |period: f64, amplitude: f64, offset: f64| {
            (t_secs * std::f64::consts::TAU / period).sin() * amplitude + offset
        };
        match sensor {
            SensorKind::Temperature => sine(60.0, 2.0, 20.0),
            SensorKind::Humidity => sine(90.0, 10.0, 45.0),
            SensorKind::Co2 => sine(120.0, 80.0, 420.0),
            SensorKind::Light => sine(30.0, 400.0, 600.0),
            SensorKind::Emg => sine(2.0, 150.0, 300.0).round(),
            SensorKind::SurfacePressure => sine(5.0, 4.0, 6.0).round(),
            SensorKind::PinReading => sine(10.0, 1000.0, 1500.0).round(),
        }
    }
}

impl Default for DemoHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub for DemoHub {
    fn is_connected(&self) -> bool {
        true
    }

    fn poll_sensor(&mut self, sensor: SensorKind, now: Duration) -> HubReading {
        HubReading::Value(Self::waveform(sensor, now.as_secs_f64()))
    }

    fn write_actuator(&mut self, channel: ActuatorChannel, value: f64) -> HubReading {
        self.last_written.push((channel, value));
        HubReading::Value(value)
    }
}

/// Permanently disconnected hub. Every poll and write reports `NoHub`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHub;

impl Hub for NullHub {
    fn is_connected(&self) -> bool {
        false
    }

    fn poll_sensor(&mut self, _sensor: SensorKind, _now: Duration) -> HubReading {
        HubReading::NoHub
    }

    fn write_actuator(&mut self, _channel: ActuatorChannel, _value: f64) -> HubReading {
        HubReading::NoHub
    }
}
