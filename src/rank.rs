use std::cmp::Ordering;

use crate::network::Probabilities;
use crate::N_CLASSES;

/// A digit label with the network's output for it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankedGuess {
    pub label: usize,
    pub probability: f64,
}

/// Order every class by probability, highest first.
///
/// Equal probabilities are ordered by ascending label, so the ranking is fully
/// deterministic. NaN outputs sort last.
pub fn rank(probabilities: &Probabilities) -> [RankedGuess; N_CLASSES] {
    let mut ranked: [RankedGuess; N_CLASSES] = array_init::array_init(|label| RankedGuess {
        label,
        probability: probabilities[label],
    });
    ranked.sort_by(|a, b| by_probability_desc(a.probability, b.probability).then(a.label.cmp(&b.label)));
    ranked
}

/// Label with the highest output. Scans in label order with a strict `>`, so
/// the first of several equal maxima wins.
pub fn top_label(probabilities: &Probabilities) -> usize {
    let mut best = 0;
    for label in 1..N_CLASSES {
        if probabilities[label] > probabilities[best] {
            best = label;
        }
    }
    best
}

fn by_probability_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
