use crate::config::{AxisRange, DatasetConfig, FunctionSetConfig};
use crate::engines::generation::chromosome::Chromosome;
use crate::error::{Result, SymregError};
use crate::functions::registry::GeneRegistry;

/// Paired (input row, expected output) samples a chromosome is scored against.
///
/// Rows always hold one value per terminal symbol, so scalar problems use
/// single-element rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    inputs: Vec<Vec<f64>>,
    outputs: Vec<f64>,
}

impl SampleSet {
    pub fn new(inputs: Vec<Vec<f64>>, outputs: Vec<f64>) -> Result<Self> {
        if inputs.len() != outputs.len() {
            return Err(SymregError::DataLoading(format!(
                "{} input rows but {} outputs",
                inputs.len(),
                outputs.len()
            )));
        }
        Ok(Self { inputs, outputs })
    }

    pub fn from_scalars(xs: &[f64], ys: &[f64]) -> Result<Self> {
        Self::new(xs.iter().map(|&x| vec![x]).collect(), ys.to_vec())
    }

    /// Sample a single-variable `target` over `[x_min, x_max)` every `step`.
    pub fn from_target(target: &Chromosome, x_min: f64, x_max: f64, step: f64) -> Self {
        Self::from_grid(target, &[AxisRange { min: x_min, max: x_max, step }])
    }

    /// Sample `target` on the cartesian grid of `axes`, one axis per terminal
    /// slot. The last axis varies fastest.
    ///
    /// Points where the target itself is undefined are skipped.
    pub fn from_grid(target: &Chromosome, axes: &[AxisRange]) -> Self {
        let points: Vec<Vec<f64>> = axes.iter().map(AxisRange::points).collect();
        let mut samples = Self::default();
        if points.iter().any(Vec::is_empty) {
            return samples;
        }

        let mut index = vec![0usize; points.len()];
        loop {
            let row: Vec<f64> = index.iter().zip(&points).map(|(&i, axis)| axis[i]).collect();
            match target.evaluate(&row) {
                Ok(y) => {
                    samples.inputs.push(row);
                    samples.outputs.push(y);
                }
                Err(e) => log::warn!("Skipping sample {:?}: {}", row, e),
            }

            let Some(axis) = (0..index.len()).rev().find(|&a| index[a] + 1 < points[a].len())
            else {
                break;
            };
            index[axis] += 1;
            index[axis + 1..].iter_mut().for_each(|i| *i = 0);
        }
        samples
    }

    /// Build the samples described by the dataset section.
    pub fn from_config(dataset: &DatasetConfig, functions: &FunctionSetConfig) -> Result<Self> {
        let samples = match &dataset.input_file {
            Some(path) => super::csv::load_samples(path, dataset.has_header)?,
            None => {
                // the target may use functions the run itself is not allowed to
                let registry = GeneRegistry::new(&functions.with_full_catalog())?;
                let target = Chromosome::read_genes(&dataset.target, &registry)?;
                log::info!("Sampling target {}", target.formula());
                let axes: Vec<AxisRange> =
                    functions.terminals.iter().map(|s| dataset.axis(s)).collect();
                Self::from_grid(&target, &axes)
            }
        };
        if samples.is_empty() {
            return Err(SymregError::DataLoading("No usable samples".to_string()));
        }
        Ok(samples)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64], f64)> + '_ {
        self.inputs
            .iter()
            .map(Vec::as_slice)
            .zip(self.outputs.iter().copied())
    }
}
