//! Nullable entropy: deterministic house seeds.

use std::sync::Mutex;

use vx_commitment::{CommitmentError, EntropySource};

/// Returns pre-configured seeds in order, cycling when exhausted.
pub struct NullEntropy {
    outputs: Vec<[u8; 32]>,
    index: Mutex<usize>,
}

impl NullEntropy {
    pub fn new(outputs: Vec<[u8; 32]>) -> Self {
        assert!(!outputs.is_empty(), "NullEntropy needs at least one output");
        Self {
            outputs,
            index: Mutex::new(0),
        }
    }

    /// The same seed on every call.
    pub fn constant(value: [u8; 32]) -> Self {
        Self::new(vec![value])
    }

    /// Number of fills served so far.
    pub fn calls(&self) -> usize {
        *self.index.lock().unwrap()
    }
}

impl EntropySource for NullEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), CommitmentError> {
        let mut idx = self.index.lock().unwrap();
        let current = &self.outputs[*idx % self.outputs.len()];
        *idx += 1;
        for (i, byte) in dest.iter_mut().enumerate() {
            *byte = current[i % 32];
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "null-entropy"
    }
}
