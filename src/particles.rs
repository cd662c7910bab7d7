use crate::error::{check_len, ProjectionError, Result};
use crate::Vec3;

#[derive(Clone, Debug, Default)]
pub struct ParticleSet {
    positions: Vec<Vec3>,
    scalar: Vec<f64>,
    smoothing: Vec<f64>,
    masses: Option<Vec<f64>>,
    sink_ids: Vec<usize>,
}

impl ParticleSet {
    pub fn new(positions: Vec<Vec3>, scalar: Vec<f64>, smoothing: Vec<f64>) -> Result<Self> {
        let n = positions.len();
        check_len("scalar", n, scalar.len())?;
        check_len("smoothing", n, smoothing.len())?;
        Ok(Self {
            positions,
            scalar,
            smoothing,
            masses: None,
            sink_ids: Vec::new(),
        })
    }

    pub fn with_masses(mut self, masses: Vec<f64>) -> Result<Self> {
        check_len("masses", self.len(), masses.len())?;
        self.masses = Some(masses);
        Ok(self)
    }

    pub fn with_sinks(mut self, sink_ids: Vec<usize>) -> Result<Self> {
        let len = self.len();
        if let Some(&index) = sink_ids.iter().find(|&&index| index >= len) {
            return Err(ProjectionError::SinkOutOfRange { index, len });
        }
        self.sink_ids = sink_ids;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn scalar(&self) -> &[f64] {
        &self.scalar
    }

    pub fn smoothing(&self) -> &[f64] {
        &self.smoothing
    }

    pub fn masses(&self) -> Option<&[f64]> {
        self.masses.as_deref()
    }

    pub fn sink_ids(&self) -> &[usize] {
        &self.sink_ids
    }

    pub fn mass(&self, index: usize) -> f64 {
        self.masses
            .as_ref()
            .and_then(|masses| masses.get(index).copied())
            .unwrap_or(0.0)
    }

    pub fn sink_flags(&self) -> Vec<bool> {
        let mut flags = vec![false; self.len()];
        for &index in &self.sink_ids {
            flags[index] = true;
        }
        flags
    }

    pub fn max_scalar(&self) -> Option<f64> {
        self.scalar
            .iter()
            .copied()
            .filter(|value| value.is_finite())
            .fold(None, |acc: Option<f64>, value| {
                Some(acc.map_or(value, |best| best.max(value)))
            })
    }
}
