// ============================================================
// Layer 5 — Burn Sequence Model
// ============================================================
// The SequenceModel implementation the application layer
// trains and queries. It owns the Burn encoder/decoder, the
// device it lives on and the loss history of every fit.
//
// Inference runs on model.valid() (dropout disabled) and
// thresholds the sigmoid probabilities:
//   p >= 0.5 → 1.0   (pitch sounding)
//   p <  0.5 → 0.0   (silent)
//
// Backend selection:
//   default        → Autodiff<NdArray>  (CPU)
//   --features wgpu → Autodiff<Wgpu>    (GPU)

use burn::{
    module::AutodiffModule,
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::CycleBatcher, dataset::CycleDataset};
use crate::domain::activity::ActivityTensor;
use crate::domain::error::{MelodyError, Result};
use crate::domain::hyperparams::Hyperparameters;
use crate::domain::traits::{SequenceModel, Topology};
use crate::infra::metrics::EpochMetrics;
use crate::ml::model::{EncoderDecoderConfig, EncoderDecoderModel};
use crate::ml::trainer;

#[cfg(not(feature = "wgpu"))]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
#[cfg(feature = "wgpu")]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

pub type DefaultSequenceModel = BurnSequenceModel<TrainBackend>;

const ACTIVE_THRESHOLD: f32 = 0.5;

pub struct BurnSequenceModel<B: AutodiffBackend> {
    model:   EncoderDecoderModel<B>,
    config:  EncoderDecoderConfig,
    hyper:   Hyperparameters,
    device:  B::Device,
    history: Vec<EpochMetrics>,
}

impl<B: AutodiffBackend> BurnSequenceModel<B> {
    /// Rebuild a trained model from a loaded network, e.g. a checkpoint.
    pub fn from_parts(
        model:  EncoderDecoderModel<B>,
        config: EncoderDecoderConfig,
        hyper:  Hyperparameters,
        device: B::Device,
    ) -> Self {
        Self { model, config, hyper, device, history: Vec::new() }
    }

    pub fn network(&self) -> &EncoderDecoderModel<B> { &self.model }

    pub fn config(&self) -> &EncoderDecoderConfig { &self.config }

    pub fn hyperparameters(&self) -> &Hyperparameters { &self.hyper }

    pub fn device(&self) -> &B::Device { &self.device }

    /// Metrics of every epoch trained so far.
    pub fn history(&self) -> &[EpochMetrics] { &self.history }

    fn check_width(&self, tensor: &ActivityTensor) -> Result<()> {
        if tensor.dim() != self.config.observed_dim {
            return Err(MelodyError::Model(format!(
                "frame width {} does not match model width {}",
                tensor.dim(),
                self.config.observed_dim
            )));
        }
        Ok(())
    }
}

impl<B: AutodiffBackend> SequenceModel for BurnSequenceModel<B> {
    fn configure(topology: Topology, hyper: &Hyperparameters) -> Result<Self> {
        hyper.validate()?;
        if topology.observed_dim == 0 || topology.hidden_dim == 0 {
            return Err(MelodyError::Configuration(format!(
                "layer widths must be positive, got {topology:?}"
            )));
        }

        let device = B::Device::default();
        let config = EncoderDecoderConfig::new(
            topology.observed_dim,
            topology.hidden_dim,
            hyper.dropout_rate,
        );
        let model = config.init::<B>(&device);
        tracing::info!(
            "Model ready: LSTM {} → {} → {}, dropout={}",
            topology.observed_dim, topology.hidden_dim, topology.observed_dim, hyper.dropout_rate
        );

        Ok(Self::from_parts(model, config, hyper.clone(), device))
    }

    fn train(&mut self, observed: &ActivityTensor, target: &ActivityTensor) -> Result<()> {
        self.check_width(observed)?;
        if observed.shape() != target.shape() {
            return Err(MelodyError::Model(format!(
                "observed shape {:?} differs from target shape {:?}",
                observed.shape(),
                target.shape()
            )));
        }

        let samples = CycleDataset::samples_from(observed, target);
        let batcher = CycleBatcher::new(observed.cycle_len(), observed.dim());

        let (model, history) = trainer::fit(
            self.model.clone(),
            samples,
            batcher,
            &self.hyper,
            &self.device,
        )?;

        self.model = model;
        self.history.extend(history);
        Ok(())
    }

    fn infer(&self, observed: &ActivityTensor) -> Result<ActivityTensor> {
        self.check_width(observed)?;
        let [n, cycle_len, dim] = observed.shape();
        if n == 0 {
            return Ok(ActivityTensor::zeros(0, cycle_len, dim));
        }

        let x = Tensor::<B::InnerBackend, 3>::from_data(
            TensorData::new(observed.values().to_vec(), [n, cycle_len, dim]),
            &self.device,
        );

        let probs  = self.model.valid().forward(x);
        let active = probs.greater_equal_elem(ACTIVE_THRESHOLD).float();

        let values = active
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| MelodyError::Model(format!("cannot read prediction: {e:?}")))?;

        ActivityTensor::from_vec(n, cycle_len, dim, values)
            .ok_or_else(|| MelodyError::Model("prediction has an unexpected size".into()))
    }
}
