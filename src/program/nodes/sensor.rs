//! Sensor node — polls the hub adapter once per tick.

use crate::hub::SensorKind;
use crate::program::node::EvalContext;
use crate::types::display_value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorNode {
    pub sensor: SensorKind,

    /// Set when the last poll found no hardware; display-only state.
    #[serde(skip)]
    no_hub: bool,
}

impl SensorNode {
    pub fn new(sensor: SensorKind) -> Self {
        Self {
            sensor,
            no_hub: false,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.no_hub
    }

    pub fn eval(&mut self, ctx: &mut EvalContext) -> f64 {
        let reading = ctx.hub.poll_sensor(self.sensor, ctx.now);
        self.no_hub = reading.is_no_hub();
        reading.value_or_nan()
    }

    /// Face text: value with units, or the connect-device warning.
    pub fn display(&self, value: f64) -> String {
        if self.no_hub {
            "⚠️ connect device".to_string()
        } else {
            format!("{} {}", display_value(value), self.sensor.units())
        }
    }
}
