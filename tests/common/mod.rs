//! Deterministic collection fixtures shared by the integration tests.
#![allow(dead_code)]

use anyhow::Result;
use ndarray::{Array2, Array3};
use rusty_collections::{convert_collection, Collection, CollectionType};

pub const N_CASES: usize = 10;
pub const N_TIMEPOINTS: usize = 20;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Minimal deterministic PRNG (xoshiro256**)
pub struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

pub fn random_numpy3d(seed: u64, n_cases: usize, n_channels: usize, n_timepoints: usize) -> Array3<f64> {
    let mut rng = SimpleRng::new(seed);
    Array3::from_shape_simple_fn((n_cases, n_channels, n_timepoints), || rng.next_f64())
}

fn from_numpy3d(x: Array3<f64>, layout: CollectionType) -> Result<Collection> {
    let x = Collection::from(x);
    Ok(convert_collection(&x, layout)?.into_owned())
}

/// 10 cases, 1 channel, 20 time points, in any layout.
pub fn equal_length_univariate(layout: CollectionType) -> Result<Collection> {
    from_numpy3d(random_numpy3d(1, N_CASES, 1, N_TIMEPOINTS), layout)
}

/// 10 cases, 2 channels, 20 time points; `None` for univariate-only layouts.
pub fn equal_length_multivariate(layout: CollectionType) -> Result<Option<Collection>> {
    if !layout.supports_multivariate() {
        return Ok(None);
    }
    from_numpy3d(random_numpy3d(2, N_CASES, 2, N_TIMEPOINTS), layout).map(Some)
}

/// 10 univariate cases of lengths 10..=19; `None` for fixed layouts.
pub fn unequal_length_univariate(layout: CollectionType) -> Result<Option<Collection>> {
    if !layout.supports_unequal_length() {
        return Ok(None);
    }
    let mut rng = SimpleRng::new(3);
    let cases: Vec<Array2<f64>> = (0..N_CASES)
        .map(|i| Array2::from_shape_simple_fn((1, 10 + i), || rng.next_f64()))
        .collect();
    let x = Collection::from(cases);
    Ok(Some(convert_collection(&x, layout)?.into_owned()))
}
