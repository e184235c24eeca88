// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader.
//
// Per epoch:
//   1. lr = learning_rate * attenuate_rate^((epoch-1) / attenuate_epoch)
//   2. Each training batch [batch, cycle_len, dim] is cut along
//      the time axis into windows of bptt_tau steps
//      (bptt_tau = 0 → one window covering the whole cycle).
//      Every window runs forward, backward and one optimiser step.
//      The recurrent state flows into the next window detached,
//      so gradients never cross a window boundary.
//   3. Validation runs on model.valid() (InnerBackend, dropout
//      off) over whole cycles.
//
// Every attenuate_epoch epochs each weight tensor whose squared
// norm reaches weight_limit is multiplied by 0.9 until it falls
// below the limit (WeightCap, a ModuleMapper).
//
// Key Burn 0.20 insight:
//   - Training uses B (an AutodiffBackend) for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - The validation loader must also target B::InnerBackend
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam
//            Williams & Peng (1990) truncated BPTT

use burn::{
    data::dataloader::DataLoaderBuilder,
    module::{AutodiffModule, ModuleMapper, Param},
    optim::{AdamConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{
    batcher::{CycleBatch, CycleBatcher},
    dataset::{CycleDataset, CycleSample},
    splitter::split_train_val,
};
use crate::domain::error::{MelodyError, Result};
use crate::domain::hyperparams::{Hyperparameters, OptimizerKind};
use crate::infra::metrics::EpochMetrics;
use crate::ml::model::{reconstruction_loss, EncoderDecoderModel, RecurrentState};

/// Train `model` on `samples` and return it with one metrics row per epoch.
pub fn fit<B: AutodiffBackend>(
    model:   EncoderDecoderModel<B>,
    samples: Vec<CycleSample>,
    batcher: CycleBatcher,
    hyper:   &Hyperparameters,
    device:  &B::Device,
) -> Result<(EncoderDecoderModel<B>, Vec<EpochMetrics>)> {
    if samples.is_empty() {
        return Err(MelodyError::EmptyDataset);
    }

    let (train, val) = split_train_val(samples, 1.0 - hyper.test_size_rate, hyper.seed);
    tracing::info!("Training on {} cycles, validating on {}", train.len(), val.len());

    match hyper.optimizer {
        OptimizerKind::Adam => {
            // m = β1*m + (1-β1)*g        (mean)
            // v = β2*v + (1-β2)*g²       (variance)
            // θ = θ - lr * m / (√v + ε)  (update)
            let optim = AdamConfig::new()
                .with_epsilon(1e-8)
                .init::<B, EncoderDecoderModel<B>>();
            run_epochs(model, optim, train, val, batcher, hyper, device)
        }
        OptimizerKind::Sgd => {
            let optim = SgdConfig::new().init::<B, EncoderDecoderModel<B>>();
            run_epochs(model, optim, train, val, batcher, hyper, device)
        }
    }
}

fn run_epochs<B, O>(
    mut model: EncoderDecoderModel<B>,
    mut optim: O,
    train:     Vec<CycleSample>,
    val:       Vec<CycleSample>,
    batcher:   CycleBatcher,
    hyper:     &Hyperparameters,
    device:    &B::Device,
) -> Result<(EncoderDecoderModel<B>, Vec<EpochMetrics>)>
where
    B: AutodiffBackend,
    O: Optimizer<EncoderDecoderModel<B>, B>,
{
    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::<B, CycleSample, CycleBatch<B>>::new(batcher.clone())
        .batch_size(hyper.batch_size)
        .shuffle(hyper.seed)
        .num_workers(1)
        .set_device(device.clone())
        .build(CycleDataset::new(train));

    // ── Validation data loader (InnerBackend, no autodiff) ───────────────────
    let has_val    = !val.is_empty();
    let val_loader =
        DataLoaderBuilder::<B::InnerBackend, CycleSample, CycleBatch<B::InnerBackend>>::new(batcher)
            .batch_size(hyper.batch_size)
            .num_workers(1)
            .set_device(device.clone())
            .build(CycleDataset::new(val));

    let mut history = Vec::with_capacity(hyper.epochs);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=hyper.epochs {
        let lr = hyper.learning_rate_at(epoch);

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_windows  = 0usize;

        for batch in train_loader.iter() {
            let (next, loss_sum, windows) = train_batch(model, &mut optim, batch, hyper, lr);
            model           = next;
            train_loss_sum += loss_sum;
            train_windows  += windows;
        }

        let avg_train_loss = if train_windows > 0 {
            train_loss_sum / train_windows as f64
        } else { f64::NAN };

        if !avg_train_loss.is_finite() {
            tracing::warn!("Epoch {}: training loss is not finite", epoch);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let avg_val_loss = if has_val {
            let model_valid = model.valid();
            let mut val_loss_sum = 0.0f64;
            let mut val_batches  = 0usize;

            for batch in val_loader.iter() {
                let probs = model_valid.forward(batch.observed);
                val_loss_sum += reconstruction_loss(probs, batch.target, hyper.loss)
                    .into_scalar()
                    .elem::<f64>();
                val_batches  += 1;
            }
            if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN }
        } else { f64::NAN };

        println!(
            "Epoch {:>4}/{} | train_loss={:.6} | val_loss={:.6} | lr={:.3e}",
            epoch, hyper.epochs, avg_train_loss, avg_val_loss, lr,
        );

        history.push(EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, lr));

        if epoch % hyper.attenuate_epoch == 0 {
            let mut cap = WeightCap::new(hyper.weight_limit);
            model = model.map(&mut cap);
            tracing::debug!("Epoch {}: weight cap shrank {} tensors", epoch, cap.shrunk);
        }
    }

    tracing::info!("Training complete!");
    Ok((model, history))
}

/// One batch of truncated BPTT. Returns (model, summed window loss, window count).
fn train_batch<B, O>(
    mut model: EncoderDecoderModel<B>,
    optim:     &mut O,
    batch:     CycleBatch<B>,
    hyper:     &Hyperparameters,
    lr:        f64,
) -> (EncoderDecoderModel<B>, f64, usize)
where
    B: AutodiffBackend,
    O: Optimizer<EncoderDecoderModel<B>, B>,
{
    let [_, steps, _] = batch.observed.dims();
    let tau = if hyper.bptt_tau == 0 { steps } else { hyper.bptt_tau.min(steps) };

    let mut state: Option<RecurrentState<B>> = None;
    let mut loss_sum = 0.0f64;
    let mut windows  = 0usize;
    let mut offset   = 0usize;

    while offset < steps {
        let len = tau.min(steps - offset);
        let x   = batch.observed.clone().narrow(1, offset, len);
        let y   = batch.target.clone().narrow(1, offset, len);

        let (probs, next_state) = model.forward_window(x, state.take());
        let loss = reconstruction_loss(probs, y, hyper.loss);
        loss_sum += loss.clone().into_scalar().elem::<f64>();
        windows  += 1;

        // Backward pass + optimiser update
        let grads = GradientsParams::from_grads(loss.backward(), &model);
        model = optim.step(lr, model, grads);

        state   = Some(next_state.detach());
        offset += len;
    }

    (model, loss_sum, windows)
}

// ─── Weight Cap ───────────────────────────────────────────────────────────────
/// Shrinks every float parameter by 0.9 per round until its sum of
/// squares is below `limit`.
pub struct WeightCap {
    limit:  f64,
    shrunk: usize,
}

const WEIGHT_SHRINK: f64 = 0.9;

impl WeightCap {
    pub fn new(limit: f64) -> Self {
        Self { limit, shrunk: 0 }
    }

    /// Scale factor 0.9^n for the smallest n with 0.81^n * sum_sq < limit.
    fn factor(&self, mut sum_sq: f64) -> f64 {
        let mut factor = 1.0;
        // A non-finite norm never drops below the limit
        while sum_sq.is_finite() && sum_sq >= self.limit {
            factor *= WEIGHT_SHRINK;
            sum_sq *= WEIGHT_SHRINK * WEIGHT_SHRINK;
        }
        factor
    }
}

impl<B: Backend> ModuleMapper<B> for WeightCap {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let (id, tensor, mapper) = param.consume();
        let sum_sq = tensor.clone().powf_scalar(2.0).sum().into_scalar().elem::<f64>();
        let factor = self.factor(sum_sq);

        let tensor = if factor < 1.0 {
            self.shrunk += 1;
            let require_grad = tensor.is_require_grad();
            tensor.detach().mul_scalar(factor).set_require_grad(require_grad)
        } else {
            tensor
        };
        Param::from_mapped_value(id, tensor, mapper)
    }
}
