use crate::keys::Key;
use serde::{Deserialize, Serialize};

/// Named continuous input channel.
///
/// `raw_value` is recomputed from mappings each frame; `value` trails it
/// through exponential smoothing. Both are sums over every mapping that
/// references this axis by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub(crate) id: usize,
    pub raw_value: f32,
    pub value: f32,
}

/// Binds one physical key to one named axis.
///
/// `scale` gives the direction of the contribution; the sign of
/// `sensitivity` also flips it, and its magnitude sets the smoothing rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisMapping {
    #[serde(rename = "Axis")]
    pub axis: String,
    #[serde(rename = "Key")]
    pub key: Key,
    #[serde(rename = "Sensitivity", default = "default_unit")]
    pub sensitivity: f32,
    #[serde(rename = "Scale", default = "default_unit")]
    pub scale: f32,
    #[serde(skip)]
    pub(crate) raw_value: f32,
    #[serde(skip)]
    pub(crate) value: f32,
}

impl AxisMapping {
    pub fn new(axis: impl Into<String>, key: Key) -> Self {
        Self {
            axis: axis.into(),
            key,
            sensitivity: 1.0,
            scale: 1.0,
            raw_value: 0.0,
            value: 0.0,
        }
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

fn default_unit() -> f32 {
    1.0
}
