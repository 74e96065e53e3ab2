//! Speed profile template from configuration.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::motion::{DEFAULT_TEMPLATE, TEMPLATE_SAMPLES};

/// Normalised speed samples at the half-lap boundaries of a 4-lap run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Template samples, start to finish.
    pub template: Vec<f32, 16>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        let mut template = Vec::new();
        for &sample in DEFAULT_TEMPLATE.iter() {
            let _ = template.push(sample);
        }
        Self { template }
    }
}

impl ProfileConfig {
    /// Template as a fixed-size array.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidProfileLength` unless there are exactly
    /// nine samples, and `ConfigError::InvalidProfileSample` for a sample
    /// that is not finite and positive.
    pub fn samples(&self) -> Result<[f32; TEMPLATE_SAMPLES], ConfigError> {
        if self.template.len() != TEMPLATE_SAMPLES {
            return Err(ConfigError::InvalidProfileLength(self.template.len()));
        }
        let mut samples = [0.0; TEMPLATE_SAMPLES];
        for (slot, &sample) in samples.iter_mut().zip(self.template.iter()) {
            if !sample.is_finite() || sample <= 0.0 {
                return Err(ConfigError::InvalidProfileSample(sample));
            }
            *slot = sample;
        }
        Ok(samples)
    }
}
