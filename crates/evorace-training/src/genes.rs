//! Operations on flattened parameter buffers.
//!
//! A weighted layer's weight matrix (row-major) or bias vector, seen as a flat sequence of
//! genes. These functions implement the per-buffer half of crossover and mutation. They
//! always build new buffers and never write to their inputs, so parents and children
//! cannot share storage.
//!
//! [`crossover`](crate::crossover) applies them layer by layer and
//! [`genetic::PopulationEvolver`](crate::genetic::PopulationEvolver) uses [`perturb`] for
//! mutation.
//!
//! # Operations
//!
//! - **Single-point crossover**: [`single_point`] and [`single_point_at`]
//! - **Uniform crossover**: [`uniform`]
//! - **Mutation**: [`perturb`]

use rand::Rng;

/// Single-point crossover with a random cut in `[1, len - 1]`.
///
/// Buffers shorter than two genes have no interior cut point and are returned unchanged.
///
/// # Arguments
///
/// * `a` - First parent's genes
/// * `b` - Second parent's genes
/// * `rng` - Random number generator
///
/// # Panics
///
/// Panics if the parents have different lengths.
///
/// # Returns
///
/// `(a[..cut] ++ b[cut..], b[..cut] ++ a[cut..])`
pub fn single_point<R>(a: &[f32], b: &[f32], rng: &mut R) -> (Vec<f32>, Vec<f32>)
where
    R: Rng + ?Sized,
{
    assert_eq!(a.len(), b.len());
    if a.len() < 2 {
        return (a.to_vec(), b.to_vec());
    }
    let cut = rng.random_range(1..a.len());
    single_point_at(a, b, cut)
}

/// Single-point crossover at a fixed cut index.
///
/// `cut` is clamped to the buffer length, so `cut = 0` or `cut >= len` swaps or keeps
/// the parents wholesale.
///
/// # Examples
///
/// ```
/// use evorace_training::genes;
///
/// let (x, y) = genes::single_point_at(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], 1);
/// assert_eq!(x, [1.0, 5.0, 6.0]);
/// assert_eq!(y, [4.0, 2.0, 3.0]);
///
/// // crossing the children again at the same cut restores the parents
/// let (a, b) = genes::single_point_at(&x, &y, 1);
/// assert_eq!(a, [1.0, 2.0, 3.0]);
/// assert_eq!(b, [4.0, 5.0, 6.0]);
/// ```
///
/// # Panics
///
/// Panics if the parents have different lengths.
#[must_use]
pub fn single_point_at(a: &[f32], b: &[f32], cut: usize) -> (Vec<f32>, Vec<f32>) {
    assert_eq!(a.len(), b.len());
    let cut = cut.min(a.len());
    let child_a = a[..cut].iter().chain(&b[cut..]).copied().collect();
    let child_b = b[..cut].iter().chain(&a[cut..]).copied().collect();
    (child_a, child_b)
}

/// Uniform crossover: a fair coin per locus decides which child gets which parent's gene.
///
/// The children are complementary, so at every locus `{x[i], y[i]} == {a[i], b[i]}`.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn uniform<R>(a: &[f32], b: &[f32], rng: &mut R) -> (Vec<f32>, Vec<f32>)
where
    R: Rng + ?Sized,
{
    assert_eq!(a.len(), b.len());
    let mut child_a = Vec::with_capacity(a.len());
    let mut child_b = Vec::with_capacity(b.len());
    for (&x, &y) in a.iter().zip(b) {
        if rng.random_bool(0.5) {
            child_a.push(x);
            child_b.push(y);
        } else {
            child_a.push(y);
            child_b.push(x);
        }
    }
    (child_a, child_b)
}

/// Copies `genes` and adds a uniform delta in `[-range, range]` to one random gene.
///
/// An empty buffer is returned as is.
///
/// # Arguments
///
/// * `genes` - Buffer to copy
/// * `range` - Maximum absolute size of the delta (sign ignored)
/// * `rng` - Random number generator
pub fn perturb<R>(genes: &[f32], range: f32, rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    let mut mutated = genes.to_vec();
    if mutated.is_empty() {
        return mutated;
    }
    let range = range.abs();
    let index = rng.random_range(0..mutated.len());
    mutated[index] += rng.random_range(-range..=range);
    mutated
}
