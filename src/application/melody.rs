// ============================================================
// Layer 2 — Melody Inference Adapter
// ============================================================
// Couples the framer, an opaque SequenceModel and the decoder
// into one learn / infer lifecycle:
//
//   Untrained ──learn──▶ Trained { pitch_range, model }
//       │                      │
//       └──restore─────────────┘   (checkpoint)
//
// learn:
//   1. validate framing + hyperparameters (nothing mutated yet)
//   2. capture [min_pitch, max_pitch] from the table
//   3. frame the table; observed doubles as the target
//   4. configure + train the model
//   5. switch to Trained
//
// inferance:
//   1. frame with the pitch range captured at training
//   2. model.infer → binary activity
//   3. decode into per-sample note lists
//
// The pitch range and the model are set exactly once.
//
// Reference: Rust Book §17 (State pattern with enums)

use crate::data::{decoder::Decoder, framer::Framer};
use crate::domain::error::{MelodyError, Result};
use crate::domain::hyperparams::{FramingConfig, Hyperparameters};
use crate::domain::note::{EventTable, NoteEvent, PitchRange};
use crate::domain::traits::{SequenceModel, Topology};

enum State<M> {
    Untrained,
    Trained { pitch_range: PitchRange, model: M },
}

pub struct MelodyInference<M: SequenceModel> {
    framing: FramingConfig,
    state:   State<M>,
}

impl<M: SequenceModel> MelodyInference<M> {
    pub fn new(framing: FramingConfig) -> Self {
        Self { framing, state: State::Untrained }
    }

    /// An adapter already in the trained state, e.g. loaded from disk.
    pub fn restore(framing: FramingConfig, pitch_range: PitchRange, model: M) -> Result<Self> {
        framing.validate()?;
        Ok(Self { framing, state: State::Trained { pitch_range, model } })
    }

    pub fn framing(&self) -> FramingConfig {
        self.framing
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, State::Trained { .. })
    }

    /// Pitch range captured by training.
    pub fn pitch_range(&self) -> Option<PitchRange> {
        match &self.state {
            State::Trained { pitch_range, .. } => Some(*pitch_range),
            State::Untrained                   => None,
        }
    }

    /// Read-only view of the trained model.
    pub fn model(&self) -> Option<&M> {
        match &self.state {
            State::Trained { model, .. } => Some(model),
            State::Untrained             => None,
        }
    }

    pub fn learn(&mut self, table: &EventTable, hyper: &Hyperparameters) -> Result<()> {
        if self.is_trained() {
            return Err(MelodyError::AlreadyTrained);
        }
        self.framing.validate()?;
        hyper.validate()?;

        let pitch_range = table.pitch_range().ok_or(MelodyError::EmptyDataset)?;
        let framer      = Framer::new(pitch_range, self.framing)?;
        let (observed, target) = framer.frame_with_target(table)?;
        if observed.is_empty() {
            return Err(MelodyError::EmptyDataset);
        }

        tracing::info!(
            "Learning from {} cycles of {} frames, pitches {}..={} (dim {})",
            observed.num_sequences(),
            observed.cycle_len(),
            pitch_range.min,
            pitch_range.max,
            pitch_range.dim()
        );

        let mut model = M::configure(Topology::new(pitch_range.dim(), hyper), hyper)?;
        model.train(&observed, &target)?;

        self.state = State::Trained { pitch_range, model };
        Ok(())
    }

    /// Predicted notes per sample, ordered by step then pitch.
    pub fn inferance(&self, table: &EventTable) -> Result<Vec<Vec<NoteEvent>>> {
        let State::Trained { pitch_range, model } = &self.state else {
            return Err(MelodyError::NotTrained);
        };

        let observed = Framer::new(*pitch_range, self.framing)?.frame(table)?;
        if observed.is_empty() {
            return Err(MelodyError::EmptyDataset);
        }

        let predicted = model.infer(&observed)?;
        if predicted.shape() != observed.shape() {
            return Err(MelodyError::Model(format!(
                "prediction shape {:?} differs from input shape {:?}",
                predicted.shape(),
                observed.shape()
            )));
        }

        let notes = Decoder::new(*pitch_range, self.framing.time_fraction).decode(&predicted)?;
        tracing::debug!(
            "Inferred {} notes over {} samples",
            notes.iter().map(Vec::len).sum::<usize>(),
            notes.len()
        );
        Ok(notes)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::ActivityTensor;
    use approx::assert_relative_eq;

    /// Returns its input unchanged.
    struct Identity {
        topology: Topology,
        trained:  bool,
    }

    impl SequenceModel for Identity {
        fn configure(topology: Topology, _: &Hyperparameters) -> Result<Self> {
            Ok(Self { topology, trained: false })
        }
        fn train(&mut self, _: &ActivityTensor, _: &ActivityTensor) -> Result<()> {
            self.trained = true;
            Ok(())
        }
        fn infer(&self, observed: &ActivityTensor) -> Result<ActivityTensor> {
            Ok(observed.clone())
        }
    }

    /// Predicts every pitch at every step.
    struct Saturated;

    impl SequenceModel for Saturated {
        fn configure(_: Topology, _: &Hyperparameters) -> Result<Self> { Ok(Self) }
        fn train(&mut self, _: &ActivityTensor, _: &ActivityTensor) -> Result<()> { Ok(()) }
        fn infer(&self, observed: &ActivityTensor) -> Result<ActivityTensor> {
            let [n, c, d] = observed.shape();
            Ok(ActivityTensor::from_vec(n, c, d, vec![1.0; n * c * d]).unwrap())
        }
    }

    /// Fails while training.
    struct Broken;

    impl SequenceModel for Broken {
        fn configure(_: Topology, _: &Hyperparameters) -> Result<Self> { Ok(Self) }
        fn train(&mut self, _: &ActivityTensor, _: &ActivityTensor) -> Result<()> {
            Err(MelodyError::Model("boom".into()))
        }
        fn infer(&self, _: &ActivityTensor) -> Result<ActivityTensor> {
            unreachable!()
        }
    }

    fn framing() -> FramingConfig {
        FramingConfig::new(2, 0.5)
    }

    fn melody() -> EventTable {
        EventTable::from(vec![
            NoteEvent::new(60, 0.0, 0.5),
            NoteEvent::new(64, 1.0, 1.5),
        ])
    }

    #[test]
    fn test_identity_round_trip_reproduces_frames() {
        let mut adapter = MelodyInference::<Identity>::new(framing());
        adapter.learn(&melody(), &Hyperparameters::default()).unwrap();

        // 0.0..=1.5 step 0.5 → 4 instants → 2 cycles of 2 steps
        let out = adapter.inferance(&melody()).unwrap();
        assert_eq!(out.len(), 2);

        // Sample 0: pitch 60 at t=0.0 and t=0.5
        assert_eq!(out[0], vec![
            NoteEvent::new(60, 0.0, 0.5),
            NoteEvent::new(60, 0.5, 1.0),
        ]);
        // Sample 1: pitch 64 at t=1.0 and t=1.5, times relative to the sample
        assert_eq!(out[1].iter().map(|n| n.pitch).collect::<Vec<_>>(), vec![64, 64]);
        assert_relative_eq!(out[1][1].start, 0.5);
        assert_relative_eq!(out[1][1].end,   1.0);
    }

    #[test]
    fn test_model_sees_training_pitch_width() {
        let mut adapter = MelodyInference::<Identity>::new(framing());
        adapter.learn(&melody(), &Hyperparameters::default()).unwrap();

        let model = adapter.model().unwrap();
        assert!(model.trained);
        assert_eq!(model.topology.observed_dim, 5);
        assert_eq!(adapter.pitch_range(), PitchRange::new(60, 64));
    }

    #[test]
    fn test_inference_keeps_training_pitch_range() {
        let mut adapter = MelodyInference::<Identity>::new(FramingConfig::new(1, 1.0));
        let wide = EventTable::from(vec![
            NoteEvent::new(40, 0.0, 1.0),
            NoteEvent::new(80, 0.0, 1.0),
        ]);
        adapter.learn(&wide, &Hyperparameters::default()).unwrap();

        let narrow = EventTable::from(vec![
            NoteEvent::new(50, 0.0, 0.0),
            NoteEvent::new(60, 0.0, 0.0),
        ]);
        let out = adapter.inferance(&narrow).unwrap();
        let pitches: Vec<u8> = out[0].iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![50, 60]);
        assert_eq!(adapter.pitch_range(), PitchRange::new(40, 80));
    }

    #[test]
    fn test_out_of_range_pitch_is_reported_at_inference() {
        let mut adapter = MelodyInference::<Identity>::new(framing());
        adapter.learn(&melody(), &Hyperparameters::default()).unwrap();

        let table = EventTable::from(vec![NoteEvent::new(72, 0.0, 1.0)]);
        assert!(matches!(
            adapter.inferance(&table),
            Err(MelodyError::PitchOutOfRange { pitch: 72, .. })
        ));
        // Pre-filtering with the trained range avoids it
        let filtered = table.within(adapter.pitch_range().unwrap());
        assert!(matches!(adapter.inferance(&filtered), Err(MelodyError::EmptyDataset)));
    }

    #[test]
    fn test_inference_before_learning_fails() {
        let adapter = MelodyInference::<Identity>::new(framing());
        assert!(matches!(adapter.inferance(&melody()), Err(MelodyError::NotTrained)));
        assert!(adapter.model().is_none());
        assert!(adapter.pitch_range().is_none());
    }

    #[test]
    fn test_learning_twice_fails() {
        let mut adapter = MelodyInference::<Identity>::new(framing());
        adapter.learn(&melody(), &Hyperparameters::default()).unwrap();

        let other = EventTable::from(vec![NoteEvent::new(30, 0.0, 5.0)]);
        assert!(matches!(
            adapter.learn(&other, &Hyperparameters::default()),
            Err(MelodyError::AlreadyTrained)
        ));
        assert_eq!(adapter.pitch_range(), PitchRange::new(60, 64));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let mut adapter = MelodyInference::<Identity>::new(framing());
        assert!(matches!(
            adapter.learn(&EventTable::default(), &Hyperparameters::default()),
            Err(MelodyError::EmptyDataset)
        ));

        adapter.learn(&melody(), &Hyperparameters::default()).unwrap();
        assert!(matches!(
            adapter.inferance(&EventTable::default()),
            Err(MelodyError::EmptyDataset)
        ));
    }

    #[test]
    fn test_table_shorter_than_one_cycle_is_empty() {
        let mut adapter = MelodyInference::<Identity>::new(FramingConfig::new(30, 0.5));
        assert!(matches!(
            adapter.learn(&melody(), &Hyperparameters::default()),
            Err(MelodyError::EmptyDataset)
        ));
        assert!(!adapter.is_trained());
    }

    #[test]
    fn test_failed_learning_leaves_adapter_untrained() {
        let mut adapter = MelodyInference::<Broken>::new(framing());
        assert!(adapter.learn(&melody(), &Hyperparameters::default()).is_err());
        assert!(!adapter.is_trained());

        let bad = Hyperparameters { epochs: 0, ..Hyperparameters::default() };
        let mut adapter = MelodyInference::<Identity>::new(framing());
        assert!(matches!(
            adapter.learn(&melody(), &bad),
            Err(MelodyError::Configuration(_))
        ));
        assert!(!adapter.is_trained());
    }

    #[test]
    fn test_saturated_prediction_is_degenerate() {
        let mut adapter = MelodyInference::<Saturated>::new(framing());
        adapter.learn(&melody(), &Hyperparameters::default()).unwrap();
        assert!(matches!(
            adapter.inferance(&melody()),
            Err(MelodyError::DegeneratePrediction { sample: 0, step: 0 })
        ));
    }

    #[test]
    fn test_restore_starts_trained() {
        let h       = Hyperparameters::default();
        let range   = PitchRange::new(60, 64).unwrap();
        let model   = Identity::configure(Topology::new(range.dim(), &h), &h).unwrap();
        let adapter = MelodyInference::restore(framing(), range, model).unwrap();
        assert!(adapter.is_trained());
        assert_eq!(adapter.inferance(&melody()).unwrap().len(), 2);
    }
}
