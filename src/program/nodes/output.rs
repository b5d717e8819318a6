//! Output nodes: simulated (demo) and physical (live) actuators.
//!
//! Outputs consume their input and translate it into a discrete on/off
//! or percentage/tilt display state. They have zero output ports and
//! feed nothing downstream.

use crate::hub::{ActuatorChannel, HubReading};
use crate::program::node::EvalContext;
use serde::{Deserialize, Serialize};

/// Gripper animation speed, fraction of full travel per millisecond.
const GRABBER_SPEED: f64 = 0.002;

/// Input port carrying the tilt value on an advanced gripper.
pub const TILT_PORT: usize = 1;

/// Simulated actuator variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemoDevice {
    LightBulb,
    Grabber,
    AdvancedGrabber,
    Fan,
    Humidifier,
}

impl DemoDevice {
    /// Binary devices display on/off; grippers display percent closed.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            DemoDevice::LightBulb | DemoDevice::Fan | DemoDevice::Humidifier
        )
    }

    /// The advanced gripper takes a second (tilt) input.
    pub fn input_arity(self) -> usize {
        if self == DemoDevice::AdvancedGrabber {
            2
        } else {
            1
        }
    }
}

/// Simulated actuator: light bulb/gripper/fan/humidifier.
///
/// Gripper position animates toward its target rather than jumping, so
/// the on-screen hardware moves at a believable speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoOutputNode {
    pub device: DemoDevice,

    #[serde(skip)]
    current_closed: f64,
    #[serde(skip)]
    current_tilt: f64,
}

impl DemoOutputNode {
    pub fn new(device: DemoDevice) -> Self {
        Self {
            device,
            current_closed: 0.0,
            current_tilt: 0.0,
        }
    }

    /// Current tilt position (advanced gripper only), 0..1.
    pub fn tilt(&self) -> f64 {
        self.current_tilt
    }

    pub fn eval(&mut self, ctx: &mut EvalContext) -> f64 {
        // Invalid input coerces to 0: the bulb turns off, the gripper opens.
        let raw = ctx.inputs[0];
        let input = if raw.is_nan() { 0.0 } else { raw };

        if self.device.is_binary() {
            return if input != 0.0 { 1.0 } else { 0.0 };
        }

        let dt_ms = ctx.dt.as_secs_f64() * 1000.0;
        self.current_closed = approach(self.current_closed, input.clamp(0.0, 1.0), dt_ms);

        if self.device == DemoDevice::AdvancedGrabber {
            let tilt_raw = ctx.inputs[TILT_PORT];
            let tilt = if tilt_raw.is_nan() { 0.0 } else { tilt_raw };
            self.current_tilt = approach(self.current_tilt, tilt.clamp(0.0, 1.0), dt_ms);
        }

        self.current_closed
    }

    pub fn display(&self, value: f64) -> String {
        if self.device.is_binary() {
            if value == 0.0 { "off" } else { "on" }.to_string()
        } else {
            format!("{}% closed", (value * 100.0).round())
        }
    }
}

fn approach(current: f64, target: f64, dt_ms: f64) -> f64 {
    let max_step = GRABBER_SPEED * dt_ms;
    let delta = target - current;
    if delta.abs() <= max_step {
        target
    } else {
        current + max_step * delta.signum()
    }
}

/// Physical actuator variants reachable through the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiveDevice {
    Gripper,
    Servo,
    HeatLamp,
    Fan,
    Humidifier,
}

impl LiveDevice {
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            LiveDevice::HeatLamp | LiveDevice::Fan | LiveDevice::Humidifier
        )
    }

    pub fn channel(self) -> ActuatorChannel {
        match self {
            LiveDevice::Gripper => ActuatorChannel::Gripper,
            LiveDevice::Servo => ActuatorChannel::Servo,
            LiveDevice::HeatLamp => ActuatorChannel::HeatLamp,
            LiveDevice::Fan => ActuatorChannel::Fan,
            LiveDevice::Humidifier => ActuatorChannel::Humidifier,
        }
    }
}

/// Physical actuator via the hub. When no hardware is reachable the node
/// keeps computing its value and reports "(no hub)" — it never raises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveOutputNode {
    pub device: LiveDevice,

    #[serde(skip)]
    no_hub: bool,
}

impl LiveOutputNode {
    pub fn new(device: LiveDevice) -> Self {
        Self {
            device,
            no_hub: false,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.no_hub
    }

    pub fn eval(&mut self, ctx: &mut EvalContext) -> f64 {
        let raw = ctx.inputs[0];
        let input = if raw.is_nan() { 0.0 } else { raw };

        let value = if self.device.is_binary() {
            if input != 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            // Grippers/servos take 0..1 and report an integer percent.
            percentage_as_int(input)
        };

        let written = ctx.hub.write_actuator(self.device.channel(), value);
        self.no_hub = matches!(written, HubReading::NoHub);

        value
    }

    pub fn display(&self, value: f64) -> String {
        let base = if self.device.is_binary() {
            if value == 0.0 { "off" } else { "on" }.to_string()
        } else {
            format!("{}% closed", value)
        };
        if self.no_hub {
            format!("{base} (no hub)")
        } else {
            base
        }
    }
}

fn percentage_as_int(v: f64) -> f64 {
    if v > 1.0 {
        100.0
    } else if v < 0.0 {
        0.0
    } else {
        (v * 100.0).round()
    }
}
