//! Dummy byte insertion and removal.
//!
//! Dummies are inserted one at a time at positions drawn from a ChaCha20
//! stream. Insertion `i` picks a position in `0..=n + i` where `n` is the
//! original length, so the decoder can replay the same draws from the final
//! length alone and strip the dummies in reverse order.

use crate::config::DUMMY_SEED_LABEL;
use crate::error::{Error, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

fn dummy_rng(random_seed: &str, dummy_count: usize) -> ChaCha20Rng {
    let mut hasher = Sha256::new();
    hasher.update(DUMMY_SEED_LABEL);
    hasher.update((dummy_count as u64).to_le_bytes());
    hasher.update(random_seed.as_bytes());
    ChaCha20Rng::from_seed(hasher.finalize().into())
}

/// Positions and values of the dummies for a payload of `original_len` bytes.
///
/// `gen_range` runs over `u32` so the sequence is identical on 32 and 64 bit
/// targets.
fn plan(original_len: usize, dummy_count: usize, random_seed: &str) -> Vec<(usize, u8)> {
    let mut rng = dummy_rng(random_seed, dummy_count);
    (0..dummy_count)
        .map(|i| {
            let upper = (original_len + i) as u32;
            let position = rng.gen_range(0..=upper) as usize;
            let value: u8 = rng.gen();
            (position, value)
        })
        .collect()
}

/// Insert `dummy_count` dummy bytes into the payload.
pub fn insert_dummies(data: &[u8], dummy_count: usize, random_seed: &str) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len() + dummy_count);
    output.extend_from_slice(data);

    for (position, value) in plan(data.len(), dummy_count, random_seed) {
        output.insert(position, value);
    }

    output
}

/// Remove dummies inserted by [`insert_dummies`] with the same settings.
pub fn remove_dummies(data: &[u8], dummy_count: usize, random_seed: &str) -> Result<Vec<u8>> {
    if data.len() < dummy_count {
        return Err(Error::DummyLength {
            length: data.len(),
            dummy_count,
        });
    }

    let original_len = data.len() - dummy_count;
    let mut output = data.to_vec();

    for (position, _) in plan(original_len, dummy_count, random_seed).into_iter().rev() {
        output.remove(position);
    }

    Ok(output)
}
