//! Parallel batch generation.
//!
//! Each episode gets its own generator and its own `StdRng` seeded from
//! `seed + index`, so a batch is identical whatever the thread count. Ids
//! restart at 0 in every episode.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::info;

use crate::catalog::Catalog;
use crate::config::GeneratorConfig;
use crate::episode::Episode;
use crate::{Result, TaskGenerator};

/// Generate `n` independent episodes in parallel.
pub fn generate_batch(
    catalog: Arc<Catalog>,
    config: &GeneratorConfig,
    seed: u64,
    n: usize,
) -> Result<Vec<Episode>> {
    config.validate()?;
    info!(n, seed, "generating batch");

    (0..n)
        .into_par_iter()
        .map(|index| {
            let rng = StdRng::seed_from_u64(episode_seed(seed, index));
            let mut generator = TaskGenerator::with_rng(catalog.clone(), config.clone(), rng)?;
            generator.episode()
        })
        .collect()
}

#[inline]
fn episode_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add(index as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_len_and_seeds() {
        let catalog = Arc::new(Catalog::standard().unwrap());
        let batch = generate_batch(catalog, &GeneratorConfig::default(), 11, 4).unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(episode_seed(u64::MAX, 1), 0);
    }

    #[test]
    fn test_batch_rejects_bad_config() {
        let catalog = Arc::new(Catalog::standard().unwrap());
        let config = GeneratorConfig {
            max_ops: 0,
            ..Default::default()
        };
        assert!(generate_batch(catalog, &config, 0, 2).is_err());
    }
}
