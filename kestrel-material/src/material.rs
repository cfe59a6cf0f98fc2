//! A material: a non-empty ordered list of passes (spec §4.4).

use crate::pass::Pass;
use kestrel_core::{EngineError, EngineResult};

#[derive(Clone, Debug)]
pub struct Material {
    passes: Vec<Pass>,
}

impl Material {
    /// Fails with [`EngineError::InvalidInsertion`] if `passes` is empty -
    /// the invariant spec §4.4 states as "a material is a non-empty
    /// ordered list of passes".
    pub fn new(passes: Vec<Pass>) -> EngineResult<Self> {
        if passes.is_empty() {
            return Err(EngineError::InvalidInsertion(
                "a material must have at least one pass".into(),
            ));
        }
        Ok(Self { passes })
    }

    pub fn single(pass: Pass) -> Self {
        Self {
            passes: vec![pass],
        }
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn push_pass(&mut self, pass: Pass) {
        self.passes.push(pass);
    }
}
