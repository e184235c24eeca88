// ============================================================
// Layer 3 — Framing and Learning Configuration
// ============================================================
// Two groups of settings:
//
//   FramingConfig    — how the timeline is sampled and cut
//                      into cycles (owned by the adapter)
//   Hyperparameters  — pass-through settings for the
//                      sequence model (owned by the model)
//
// Neither group carries any algorithm of its own. They are only
// checked for range sanity before any model call is made.

use serde::{Deserialize, Serialize};

use crate::domain::error::{MelodyError, Result};

/// Sampling resolution and cycle length of the framer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramingConfig {
    /// Number of sampled instants per training/inference example
    pub cycle_len: usize,
    /// Distance between two sampled instants, in table time units
    pub time_fraction: f64,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self { cycle_len: 30, time_fraction: 0.01 }
    }
}

impl FramingConfig {
    pub fn new(cycle_len: usize, time_fraction: f64) -> Self {
        Self { cycle_len, time_fraction }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycle_len == 0 {
            return Err(MelodyError::Configuration("cycle_len must be > 0".into()));
        }
        if !self.time_fraction.is_finite() || self.time_fraction <= 0.0 {
            return Err(MelodyError::Configuration(format!(
                "time_fraction must be a finite value > 0, got {}",
                self.time_fraction
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerKind {
    Adam,
    Sgd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossKind {
    MeanSquaredError,
    BinaryCrossEntropy,
}

/// Settings forwarded to the sequence model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Width of the recurrent hidden state
    pub hidden_neuron_count: usize,
    pub epochs:              usize,
    pub batch_size:          usize,
    pub learning_rate:       f64,
    /// Multiply the learning rate by this factor every `attenuate_epoch` epochs
    pub learning_attenuate_rate: f64,
    pub attenuate_epoch:     usize,
    /// Time steps per truncated-BPTT window; 0 uses the whole cycle
    pub bptt_tau:            usize,
    /// Every `attenuate_epoch` epochs, each weight tensor is scaled by 0.9
    /// until its sum of squares is below this value
    pub weight_limit:        f64,
    pub dropout_rate:        f64,
    /// Fraction of cycles held out for validation
    pub test_size_rate:      f64,
    pub optimizer:           OptimizerKind,
    pub loss:                LossKind,
    /// Seed for the shuffle before the train/validation split
    pub seed:                u64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            hidden_neuron_count:     200,
            epochs:                  1000,
            batch_size:              50,
            learning_rate:           1e-5,
            learning_attenuate_rate: 0.1,
            attenuate_epoch:         50,
            bptt_tau:                8,
            weight_limit:            0.5,
            dropout_rate:            0.5,
            test_size_rate:          0.3,
            optimizer:               OptimizerKind::Adam,
            loss:                    LossKind::MeanSquaredError,
            seed:                    42,
        }
    }
}

impl Hyperparameters {
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(MelodyError::Configuration(msg));

        if self.hidden_neuron_count == 0 {
            return bad("hidden_neuron_count must be > 0".into());
        }
        if self.epochs == 0 {
            return bad("epochs must be > 0".into());
        }
        if self.batch_size == 0 {
            return bad("batch_size must be > 0".into());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return bad(format!("learning_rate must be > 0, got {}", self.learning_rate));
        }
        if !self.learning_attenuate_rate.is_finite() || self.learning_attenuate_rate <= 0.0 {
            return bad(format!(
                "learning_attenuate_rate must be > 0, got {}",
                self.learning_attenuate_rate
            ));
        }
        if self.attenuate_epoch == 0 {
            return bad("attenuate_epoch must be > 0".into());
        }
        if !self.weight_limit.is_finite() || self.weight_limit <= 0.0 {
            return bad(format!("weight_limit must be > 0, got {}", self.weight_limit));
        }
        if !(0.0..1.0).contains(&self.dropout_rate) {
            return bad(format!("dropout_rate must be in [0, 1), got {}", self.dropout_rate));
        }
        if !(0.0..1.0).contains(&self.test_size_rate) {
            return bad(format!("test_size_rate must be in [0, 1), got {}", self.test_size_rate));
        }
        Ok(())
    }

    /// Step-decayed learning rate for a 1-based epoch number.
    ///
    /// Epochs 1..=attenuate_epoch use the base rate, the next
    /// `attenuate_epoch` epochs use `rate * attenuate`, and so on.
    pub fn learning_rate_at(&self, epoch: usize) -> f64 {
        let decays = epoch.saturating_sub(1) / self.attenuate_epoch.max(1);
        self.learning_rate * self.learning_attenuate_rate.powi(decays as i32)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        assert!(FramingConfig::default().validate().is_ok());
        assert!(Hyperparameters::default().validate().is_ok());
    }

    #[test]
    fn test_framing_rejects_non_positive_values() {
        assert!(FramingConfig::new(0, 0.01).validate().is_err());
        assert!(FramingConfig::new(30, 0.0).validate().is_err());
        assert!(FramingConfig::new(30, -0.5).validate().is_err());
        assert!(FramingConfig::new(30, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_hyperparameters_reject_out_of_range() {
        let cases: Vec<fn(&mut Hyperparameters)> = vec![
            |h| h.epochs = 0,
            |h| h.batch_size = 0,
            |h| h.hidden_neuron_count = 0,
            |h| h.learning_rate = 0.0,
            |h| h.learning_attenuate_rate = -1.0,
            |h| h.attenuate_epoch = 0,
            |h| h.weight_limit = f64::INFINITY,
            |h| h.dropout_rate = 1.0,
            |h| h.dropout_rate = -0.1,
            |h| h.test_size_rate = 1.0,
        ];
        for mutate in cases {
            let mut h = Hyperparameters::default();
            mutate(&mut h);
            assert!(
                matches!(h.validate(), Err(MelodyError::Configuration(_))),
                "accepted {h:?}"
            );
        }
    }

    #[test]
    fn test_zero_dropout_and_test_size_are_allowed() {
        let h = Hyperparameters { dropout_rate: 0.0, test_size_rate: 0.0, ..Default::default() };
        assert!(h.validate().is_ok());
    }

    #[test]
    fn test_learning_rate_step_decay() {
        let h = Hyperparameters {
            learning_rate: 1.0,
            learning_attenuate_rate: 0.1,
            attenuate_epoch: 50,
            ..Default::default()
        };
        assert_relative_eq!(h.learning_rate_at(1), 1.0);
        assert_relative_eq!(h.learning_rate_at(50), 1.0);
        assert_relative_eq!(h.learning_rate_at(51), 0.1);
        assert_relative_eq!(h.learning_rate_at(101), 0.01, epsilon = 1e-12);
    }
}
