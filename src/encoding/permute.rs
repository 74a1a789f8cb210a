//! Seeded byte permutation.
//!
//! A Fisher-Yates shuffle driven by ChaCha20 seeded from the random seed. The
//! inverse is recovered by shuffling an index vector with the same stream.

use crate::config::PERMUTE_SEED_LABEL;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

fn permutation(len: usize, random_seed: &str) -> Vec<usize> {
    let mut hasher = Sha256::new();
    hasher.update(PERMUTE_SEED_LABEL);
    hasher.update(random_seed.as_bytes());
    let mut rng = ChaCha20Rng::from_seed(hasher.finalize().into());

    let mut indices: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        // u32 keeps the stream consumption identical across pointer widths.
        let j = rng.gen_range(0..=i as u32) as usize;
        indices.swap(i, j);
    }
    indices
}

/// Shuffle the bytes of `data`.
pub fn permute(data: &[u8], random_seed: &str) -> Vec<u8> {
    permutation(data.len(), random_seed)
        .into_iter()
        .map(|source| data[source])
        .collect()
}

/// Undo [`permute`] with the same seed.
pub fn unpermute(data: &[u8], random_seed: &str) -> Vec<u8> {
    let mut output = vec![0u8; data.len()];
    for (position, source) in permutation(data.len(), random_seed).into_iter().enumerate() {
        output[source] = data[position];
    }
    output
}
