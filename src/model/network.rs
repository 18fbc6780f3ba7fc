// Dense next-chord network: embedding + hidden layer + softmax head
//
// The offline trainer exports weights as JSON. Inference is a pure function
// of the last three chord indices and mutates nothing, so a loaded network
// can be shared across concurrent requests.

use ndarray::{s, Array1, Array2};
use serde::Deserialize;
use std::path::Path;

/// Raw artifact shape written by the trainer. All matrices are row-major
/// nested arrays.
#[derive(Debug, Deserialize)]
struct NetworkFile {
    vocab_size: usize,
    embedding: Vec<Vec<f32>>,
    hidden_weight: Vec<Vec<f32>>,
    hidden_bias: Vec<f32>,
    output_weight: Vec<Vec<f32>>,
    output_bias: Vec<f32>,
}

/// Loaded model weights for one mood.
#[derive(Debug, Clone)]
pub struct ChordNetwork {
    embedding: Array2<f32>,
    hidden_weight: Array2<f32>,
    hidden_bias: Array1<f32>,
    output_weight: Array2<f32>,
    output_bias: Array1<f32>,
}

impl ChordNetwork {
    /// Load a model artifact from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a model artifact from its JSON representation, validating that
    /// all weight shapes agree.
    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let file: NetworkFile = serde_json::from_str(contents)?;

        let embedding = to_matrix(file.embedding, "embedding")?;
        let hidden_weight = to_matrix(file.hidden_weight, "hidden_weight")?;
        let output_weight = to_matrix(file.output_weight, "output_weight")?;
        let hidden_bias = Array1::from_vec(file.hidden_bias);
        let output_bias = Array1::from_vec(file.output_bias);

        if embedding.nrows() != file.vocab_size {
            anyhow::bail!(
                "embedding has {} rows but vocab_size is {}",
                embedding.nrows(),
                file.vocab_size
            );
        }
        let dim = embedding.ncols();
        if hidden_weight.nrows() != 3 * dim {
            anyhow::bail!(
                "hidden_weight expects {} inputs but window embedding is {}",
                hidden_weight.nrows(),
                3 * dim
            );
        }
        if hidden_bias.len() != hidden_weight.ncols() {
            anyhow::bail!("hidden_bias length does not match hidden layer width");
        }
        if output_weight.nrows() != hidden_weight.ncols() {
            anyhow::bail!("output_weight does not match hidden layer width");
        }
        if output_weight.ncols() != file.vocab_size || output_bias.len() != file.vocab_size {
            anyhow::bail!("output layer does not cover the vocabulary");
        }

        Ok(Self {
            embedding,
            hidden_weight,
            hidden_bias,
            output_weight,
            output_bias,
        })
    }

    /// Size of the vocabulary the network predicts over.
    pub fn vocab_size(&self) -> usize {
        self.embedding.nrows()
    }

    /// Probability distribution over the vocabulary for the chord following
    /// the given window of three chord indices.
    pub fn predict(&self, window: [usize; 3]) -> anyhow::Result<Vec<f32>> {
        let dim = self.embedding.ncols();
        let mut input = Array1::<f32>::zeros(3 * dim);
        for (slot, &index) in window.iter().enumerate() {
            if index >= self.embedding.nrows() {
                anyhow::bail!(
                    "chord index {} out of range for vocabulary of {}",
                    index,
                    self.embedding.nrows()
                );
            }
            input
                .slice_mut(s![slot * dim..(slot + 1) * dim])
                .assign(&self.embedding.row(index));
        }

        let hidden = (input.dot(&self.hidden_weight) + &self.hidden_bias).mapv(f32::tanh);
        let logits = hidden.dot(&self.output_weight) + &self.output_bias;
        Ok(softmax(&logits))
    }
}

/// Convert nested rows into a matrix, rejecting empty or ragged input.
fn to_matrix(rows: Vec<Vec<f32>>, name: &str) -> anyhow::Result<Array2<f32>> {
    let nrows = rows.len();
    let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
    if nrows == 0 || ncols == 0 {
        anyhow::bail!("{} matrix is empty", name);
    }
    if rows.iter().any(|r| r.len() != ncols) {
        anyhow::bail!("{} matrix has ragged rows", name);
    }
    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Ok(Array2::from_shape_vec((nrows, ncols), flat)?)
}

/// Numerically stable softmax.
fn softmax(logits: &Array1<f32>) -> Vec<f32> {
    let max = logits.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|x| x / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3-chord vocabulary, 1-dim embedding, 2-wide hidden layer. The output
    /// bias dominates, so every window predicts index 2.
    const TINY_NETWORK: &str = r#"{
        "vocab_size": 3,
        "embedding": [[0.1], [0.2], [0.3]],
        "hidden_weight": [[0.0, 0.0], [0.0, 0.0], [0.0, 0.0]],
        "hidden_bias": [0.0, 0.0],
        "output_weight": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
        "output_bias": [0.0, 1.0, 5.0]
    }"#;

    #[test]
    fn test_predict_distribution() {
        let network = ChordNetwork::from_json(TINY_NETWORK).unwrap();
        assert_eq!(network.vocab_size(), 3);

        let probs = network.predict([0, 1, 2]).unwrap();
        assert_eq!(probs.len(), 3);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        // Bias puts almost all mass on index 2
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let network = ChordNetwork::from_json(TINY_NETWORK).unwrap();
        assert!(network.predict([0, 1, 3]).is_err());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        // vocab_size disagrees with the embedding row count
        let bad = TINY_NETWORK.replace("\"vocab_size\": 3", "\"vocab_size\": 4");
        assert!(ChordNetwork::from_json(&bad).is_err());
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let bad = r#"{
            "vocab_size": 2,
            "embedding": [[0.1], [0.2, 0.3]],
            "hidden_weight": [[0.0], [0.0], [0.0]],
            "hidden_bias": [0.0],
            "output_weight": [[0.0, 0.0]],
            "output_bias": [0.0, 0.0]
        }"#;
        assert!(ChordNetwork::from_json(bad).is_err());
    }
}
