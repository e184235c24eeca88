use burn::{
    nn::{
        loss::{MseLoss, Reduction},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
    },
    prelude::*,
    tensor::activation::sigmoid,
};

use crate::domain::hyperparams::LossKind;

// Probabilities are clamped away from 0 and 1 before taking logs.
const BCE_EPSILON: f32 = 1e-7;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally, so do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct EncoderDecoderConfig {
    pub observed_dim: usize,
    pub hidden_dim:   usize,
    pub dropout:      f64,
}

impl EncoderDecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EncoderDecoderModel<B> {
        let encoder = LstmConfig::new(self.observed_dim, self.hidden_dim, true).init(device);
        let decoder = LstmConfig::new(self.hidden_dim, self.hidden_dim, true).init(device);
        let output  = LinearConfig::new(self.hidden_dim, self.observed_dim).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderDecoderModel { encoder, decoder, output, dropout }
    }
}

/// Encoder LSTM reads a window of frames; the decoder LSTM, seeded with
/// the encoder's final state, rebuilds one activity frame per step.
#[derive(Module, Debug)]
pub struct EncoderDecoderModel<B: Backend> {
    pub encoder: Lstm<B>,
    pub decoder: Lstm<B>,
    pub output:  Linear<B>,
    pub dropout: Dropout,
}

/// Recurrent state carried from one truncated-BPTT window to the next.
pub struct RecurrentState<B: Backend> {
    pub encoder: LstmState<B, 2>,
    pub decoder: LstmState<B, 2>,
}

impl<B: Backend> RecurrentState<B> {
    /// Cut the autodiff graph so the next window does not backprop into this one.
    pub fn detach(self) -> Self {
        let cut = |s: LstmState<B, 2>| LstmState::new(s.cell.detach(), s.hidden.detach());
        Self { encoder: cut(self.encoder), decoder: cut(self.decoder) }
    }
}

impl<B: Backend> EncoderDecoderModel<B> {
    /// x: [batch, steps, dim] → activation probabilities [batch, steps, dim]
    pub fn forward_window(
        &self,
        x:     Tensor<B, 3>,
        state: Option<RecurrentState<B>>,
    ) -> (Tensor<B, 3>, RecurrentState<B>) {
        let (enc_state, dec_state) = match state {
            Some(s) => (Some(s.encoder), Some(s.decoder)),
            None    => (None, None),
        };

        let (encoded, enc_final) = self.encoder.forward(x, enc_state);
        let encoded = self.dropout.forward(encoded);

        // First window: the decoder starts from the encoder's summary.
        let dec_init = dec_state.unwrap_or_else(|| {
            LstmState::new(enc_final.cell.clone(), enc_final.hidden.clone())
        });
        let (decoded, dec_final) = self.decoder.forward(encoded, Some(dec_init));
        let decoded = self.dropout.forward(decoded);

        let probs = sigmoid(self.output.forward(decoded));
        (probs, RecurrentState { encoder: enc_final, decoder: dec_final })
    }

    /// Whole cycles in one pass.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        self.forward_window(x, None).0
    }
}

/// Mean reconstruction loss between predicted probabilities and binary targets.
pub fn reconstruction_loss<B: Backend>(
    probs:  Tensor<B, 3>,
    target: Tensor<B, 3>,
    kind:   LossKind,
) -> Tensor<B, 1> {
    match kind {
        LossKind::MeanSquaredError => MseLoss::new().forward(probs, target, Reduction::Mean),
        LossKind::BinaryCrossEntropy => {
            // -(t·ln p + (1 - t)·ln(1 - p))
            let p        = probs.clamp(BCE_EPSILON, 1.0 - BCE_EPSILON);
            let positive = target.clone() * p.clone().log();
            let negative = target.neg().add_scalar(1.0) * p.neg().add_scalar(1.0).log();
            (positive + negative).neg().mean()
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use burn::backend::NdArray;

    type B = NdArray;

    fn tensor(values: Vec<f32>, shape: [usize; 3]) -> Tensor<B, 3> {
        Tensor::from_data(TensorData::new(values, shape), &Default::default())
    }

    #[test]
    fn test_forward_keeps_shape_and_bounds() {
        let device = Default::default();
        let model  = EncoderDecoderConfig::new(6, 8, 0.0).init::<B>(&device);
        let probs  = model.forward(tensor(vec![1.0; 2 * 5 * 6], [2, 5, 6]));

        assert_eq!(probs.dims(), [2, 5, 6]);
        let values = probs.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_window_state_carries_over() {
        let device = Default::default();
        let model  = EncoderDecoderConfig::new(3, 4, 0.0).init::<B>(&device);
        let (_, state) = model.forward_window(tensor(vec![0.0; 3 * 3], [1, 3, 3]), None);
        let state      = state.detach();
        assert_eq!(state.encoder.hidden.dims(), [1, 4]);

        let (probs, _) = model.forward_window(tensor(vec![1.0; 2 * 3], [1, 2, 3]), Some(state));
        assert_eq!(probs.dims(), [1, 2, 3]);
    }

    #[test]
    fn test_mse_of_perfect_prediction_is_zero() {
        let t    = tensor(vec![1.0, 0.0, 0.0, 1.0], [1, 2, 2]);
        let loss = reconstruction_loss(t.clone(), t, LossKind::MeanSquaredError);
        assert_relative_eq!(loss.into_scalar().elem::<f64>(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bce_of_half_probability_is_ln2() {
        let probs  = tensor(vec![0.5; 4], [1, 2, 2]);
        let target = tensor(vec![1.0, 0.0, 0.0, 1.0], [1, 2, 2]);
        let loss   = reconstruction_loss(probs, target, LossKind::BinaryCrossEntropy);
        assert_relative_eq!(
            loss.into_scalar().elem::<f64>(),
            std::f64::consts::LN_2,
            epsilon = 1e-5
        );
    }
}
