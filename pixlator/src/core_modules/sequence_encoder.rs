// THEORY:
// The `SequenceEncoder` compresses the colors met along a group's path into
// `(color_index, run_length)` pairs. A single left-to-right scan merges equal
// neighbours; a new pair starts whenever the color changes. The encoding is
// lossless: `decode(encode(c)) == c` for every input.
//
// An empty input yields an empty sequence. Groups are never empty (the numbering
// layer rejects that case), so an empty sequence never reaches a result.

use serde::{Deserialize, Serialize};

/// One run of equal colors. Serialized as `[color_index, run_length]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Run {
    pub color_index: usize,
    pub run_length: usize,
}

impl From<(usize, usize)> for Run {
    fn from((color_index, run_length): (usize, usize)) -> Self {
        Self {
            color_index,
            run_length,
        }
    }
}

impl From<Run> for (usize, usize) {
    fn from(run: Run) -> Self {
        (run.color_index, run.run_length)
    }
}

pub mod sequence_encoder {
    use super::Run;

    pub fn encode<I>(colors: I) -> Vec<Run>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut runs: Vec<Run> = Vec::new();
        for color in colors {
            match runs.last_mut() {
                Some(run) if run.color_index == color => run.run_length += 1,
                _ => runs.push(Run {
                    color_index: color,
                    run_length: 1,
                }),
            }
        }
        runs
    }

    /// Expands each run into `run_length` copies of its color.
    pub fn decode(runs: &[Run]) -> Vec<usize> {
        runs.iter()
            .flat_map(|run| std::iter::repeat_n(run.color_index, run.run_length))
            .collect()
    }

    /// Number of pixels a sequence covers.
    pub fn covered(runs: &[Run]) -> usize {
        runs.iter().map(|run| run.run_length).sum()
    }
}
