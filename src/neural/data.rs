//! Training data containers.

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1};

/// One labelled example, stored as column vectors
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub input: Array2<f32>,
    pub target: Array2<f32>,
}

impl Sample {
    pub fn new(input: &[f32], target: &[f32]) -> Self {
        Self {
            input: column(input),
            target: column(target),
        }
    }

    pub fn input_len(&self) -> usize {
        self.input.nrows()
    }

    pub fn target_len(&self) -> usize {
        self.target.nrows()
    }
}

/// Build an `(n, 1)` column vector from a slice
pub fn column(values: &[f32]) -> Array2<f32> {
    Array2::from_shape_fn((values.len(), 1), |(i, _)| values[i])
}

/// Row-major training matrix with one target row per input row.
///
/// The delta-rule trainers read `inputs` directly (bias carried as a constant column);
/// back-propagation consumes the same data as a list of [`Sample`]s.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSet {
    inputs: Array2<f32>,
    targets: Array2<f32>,
}

impl TrainingSet {
    pub fn new(inputs: Array2<f32>, targets: Array2<f32>) -> Result<Self> {
        if inputs.nrows() != targets.nrows() {
            return Err(Error::len(
                "training set rows",
                inputs.nrows(),
                targets.nrows(),
            ));
        }
        if inputs.nrows() == 0 {
            return Err(Error::InvalidParameter(
                "training set must contain at least one row".to_string(),
            ));
        }
        Ok(Self { inputs, targets })
    }

    /// Single-output set: `inputs` is `rows x cols` in row-major order, one target per row.
    ///
    /// For the delta-rule trainers `cols` includes the constant bias column, so
    /// a two-input gate is stored with three columns (`[1, x1, x2]`).
    pub fn from_rows(cols: usize, inputs: Vec<f32>, targets: Vec<f32>) -> Result<Self> {
        if cols == 0 || inputs.len() % cols != 0 {
            return Err(Error::len("training matrix elements", cols, inputs.len()));
        }
        let rows = inputs.len() / cols;
        let inputs = Array2::from_shape_vec((rows, cols), inputs)
            .map_err(|e| Error::InvalidParameter(e.to_string()))?;
        let targets = Array2::from_shape_vec((targets.len(), 1), targets)
            .map_err(|e| Error::InvalidParameter(e.to_string()))?;
        Self::new(inputs, targets)
    }

    pub fn from_samples(samples: &[Sample]) -> Result<Self> {
        let first = samples.first().ok_or_else(|| {
            Error::InvalidParameter("training set must contain at least one row".to_string())
        })?;
        let (n_in, n_out) = (first.input_len(), first.target_len());

        let mut inputs = Array2::zeros((samples.len(), n_in));
        let mut targets = Array2::zeros((samples.len(), n_out));
        for (i, sample) in samples.iter().enumerate() {
            if sample.input_len() != n_in {
                return Err(Error::len("sample input", n_in, sample.input_len()));
            }
            if sample.target_len() != n_out {
                return Err(Error::len("sample target", n_out, sample.target_len()));
            }
            inputs.row_mut(i).assign(&sample.input.column(0));
            targets.row_mut(i).assign(&sample.target.column(0));
        }
        Self::new(inputs, targets)
    }

    pub fn rows(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn input_width(&self) -> usize {
        self.inputs.ncols()
    }

    pub fn target_width(&self) -> usize {
        self.targets.ncols()
    }

    pub fn inputs(&self) -> &Array2<f32> {
        &self.inputs
    }

    pub fn targets(&self) -> &Array2<f32> {
        &self.targets
    }

    pub fn input_row(&self, row: usize) -> ArrayView1<'_, f32> {
        self.inputs.row(row)
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.inputs
            .rows()
            .into_iter()
            .zip(self.targets.rows())
            .map(|(x, y)| Sample {
                input: x.to_owned().insert_axis(ndarray::Axis(1)),
                target: y.to_owned().insert_axis(ndarray::Axis(1)),
            })
            .collect()
    }
}
