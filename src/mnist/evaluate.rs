use rayon::prelude::*;
use tracing::info;

use super::Sample;
use crate::error::Result;
use crate::network::{NetworkModel, Probabilities};
use crate::rank::top_label;

/// Accuracy and mean squared error of a model over a labelled set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    // Mean of 0.5 * ||one_hot(label) - output||^2
    pub mean_error: f64,
}

// Classify every sample in parallel and compare against its label
pub fn evaluate(model: &NetworkModel, samples: &[Sample]) -> Result<Evaluation> {
    let scored = samples
        .par_iter()
        .map(|sample| -> Result<(bool, f64)> {
            let output = model.classify_grid(&sample.grid)?;
            Ok((
                top_label(&output) == sample.label,
                squared_error(&output, sample.label),
            ))
        })
        .collect::<Result<Vec<(bool, f64)>>>()?;

    let total = scored.len();
    let correct = scored.iter().filter(|(hit, _)| *hit).count();
    let error: f64 = scored.iter().map(|(_, e)| e).sum();
    let (accuracy, mean_error) = if total == 0 {
        (0.0, 0.0)
    } else {
        (correct as f64 / total as f64, error / total as f64)
    };

    info!(total, correct, accuracy, mean_error, "evaluated model");
    Ok(Evaluation {
        total,
        correct,
        accuracy,
        mean_error,
    })
}

fn squared_error(output: &Probabilities, label: usize) -> f64 {
    0.5 * output
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let expected = if i == label { 1.0 } else { 0.0 };
            (expected - p).powi(2)
        })
        .sum::<f64>()
}
