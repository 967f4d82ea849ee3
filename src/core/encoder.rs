//! Taste embedding model.
//!
//! A small fixed-topology feed-forward network maps the 64-wide feature
//! vector to a unit-length 512-wide embedding:
//!
//! ```text
//! Linear(64 -> 256) -> ReLU -> Linear(256 -> 512) -> ReLU
//!   -> Linear(512 -> 512) -> LayerNorm(512) -> L2 normalize
//! ```
//!
//! There is no training loop. Weights come from a seeded RNG with the usual
//! `U(-1/sqrt(fan_in), 1/sqrt(fan_in))` linear-layer init, so every process
//! built with the same seed produces identical embeddings for identical
//! profiles. Dropout is an identity at inference time and is not modelled.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::features::{feature_vector, FEATURE_DIM};
use crate::models::TasteProfile;

pub const EMBEDDING_DIM: usize = 512;
const HIDDEN_1: usize = 256;
const HIDDEN_2: usize = 512;
const LAYER_NORM_EPS: f32 = 1e-5;

/// Dense layer with row-major `[out][in]` weights
#[derive(Debug, Clone)]
struct Linear {
    in_dim: usize,
    out_dim: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
}

impl Linear {
    fn seeded(in_dim: usize, out_dim: usize, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (in_dim as f32).sqrt();
        let weights = (0..in_dim * out_dim)
            .map(|_| rng.gen_range(-bound..bound))
            .collect();
        let bias = (0..out_dim).map(|_| rng.gen_range(-bound..bound)).collect();

        Self { in_dim, out_dim, weights, bias }
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        debug_assert_eq!(input.len(), self.in_dim);

        self.weights
            .chunks_exact(self.in_dim)
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect()
    }
}

#[inline]
fn relu(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = v.max(0.0);
    }
}

/// LayerNorm with unit gain and zero shift
fn layer_norm(values: &mut [f32]) {
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    let denom = (var + LAYER_NORM_EPS).sqrt();

    for v in values.iter_mut() {
        *v = (*v - mean) / denom;
    }
}

fn l2_normalize(values: &mut [f32]) {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in values.iter_mut() {
            *v /= norm;
        }
    }
}

/// Encodes taste profiles into embeddings for nearest-neighbour lookup
#[derive(Debug, Clone)]
pub struct TasteEncoder {
    layers: [Linear; 3],
}

impl TasteEncoder {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let layers = [
            Linear::seeded(FEATURE_DIM, HIDDEN_1, &mut rng),
            Linear::seeded(HIDDEN_1, HIDDEN_2, &mut rng),
            Linear::seeded(HIDDEN_2, EMBEDDING_DIM, &mut rng),
        ];

        debug_assert_eq!(layers[2].out_dim, EMBEDDING_DIM);
        Self { layers }
    }

    /// Encode a taste profile to a unit-length embedding
    pub fn encode(&self, profile: &TasteProfile) -> Vec<f32> {
        self.encode_features(&feature_vector(profile))
    }

    pub fn encode_features(&self, features: &[f32; FEATURE_DIM]) -> Vec<f32> {
        let [l1, l2, l3] = &self.layers;

        let mut hidden = l1.forward(features);
        relu(&mut hidden);
        let mut hidden = l2.forward(&hidden);
        relu(&mut hidden);
        let mut out = l3.forward(&hidden);
        layer_norm(&mut out);
        l2_normalize(&mut out);

        out
    }
}

impl Default for TasteEncoder {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Cosine similarity between two vectors; 0 when either has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }

    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}
