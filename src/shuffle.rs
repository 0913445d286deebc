//! Unbiased Fisher-Yates shuffling driven by a cryptographic generator.
//!
//! Every step reads one 32-bit value from the generator. Values that would
//! skew the modulo reduction are rejected and redrawn, so each of the `n!`
//! orderings is equally likely.

use anyhow::Context;
use rand::RngCore;

/// Read one 32-bit value from `rng`.
///
/// Uses `try_fill_bytes` so a failing OS source is reported instead of
/// panicking.
///
/// # Errors
/// Returns an error if the generator cannot produce randomness.
pub fn next_u32<R: RngCore + ?Sized>(rng: &mut R) -> anyhow::Result<u32> {
    let mut raw = [0_u8; 4];
    rng.try_fill_bytes(&mut raw)
        .context("read randomness for shuffle")?;
    Ok(u32::from_le_bytes(raw))
}

/// Draw a uniform value in `0..bound`.
///
/// `bound` of zero yields zero without consuming randomness.
///
/// # Errors
/// Returns an error if the generator cannot produce randomness.
pub fn uniform_below<R: RngCore + ?Sized>(rng: &mut R, bound: u32) -> anyhow::Result<u32> {
    if bound <= 1 {
        return Ok(0);
    }
    // Largest multiple of `bound` that fits in 2^32; values at or above it are redrawn.
    let zone = u64::from(u32::MAX) + 1 - (u64::from(u32::MAX) + 1) % u64::from(bound);
    loop {
        let x = next_u32(rng)?;
        if u64::from(x) < zone {
            return Ok(x % bound);
        }
    }
}

/// Shuffle `items` in place.
///
/// # Errors
/// Returns an error if the generator fails or `items` is longer than
/// `u32::MAX`. On error `items` may be partially shuffled.
pub fn fisher_yates<T, R: RngCore + ?Sized>(items: &mut [T], rng: &mut R) -> anyhow::Result<()> {
    anyhow::ensure!(
        u32::try_from(items.len()).is_ok(),
        "cannot shuffle {} items",
        items.len()
    );
    for i in (1..items.len()).rev() {
        let bound = u32::try_from(i + 1).context("shuffle index")?;
        let j = usize::try_from(uniform_below(rng, bound)?).context("shuffle index")?;
        items.swap(i, j);
    }
    Ok(())
}

/// Return a random permutation of `1..=n`.
///
/// # Errors
/// Returns an error if the generator fails or `n` exceeds `u32::MAX`.
pub fn shuffled_sequence<R: RngCore + ?Sized>(n: usize, rng: &mut R) -> anyhow::Result<Vec<u32>> {
    let n = u32::try_from(n).with_context(|| format!("sequence of {n} numbers is too long"))?;
    let mut numbers: Vec<u32> = (1..=n).collect();
    fisher_yates(&mut numbers, rng)?;
    Ok(numbers)
}

/// Return a random permutation of `1..=n` using OS randomness.
///
/// # Errors
/// Returns an error if OS randomness cannot be read.
pub fn os_shuffled_sequence(n: usize) -> anyhow::Result<Vec<u32>> {
    shuffled_sequence(n, &mut rand::rngs::OsRng)
}
