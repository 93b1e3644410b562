#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

/// Element count above which curve generators go wide.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// Runs `f` over every element, in parallel once `slice.len()` exceeds
/// `threshold`. Each call only sees its own element.
pub fn for_each_indexed_mut<T, F>(slice: &mut [T], threshold: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        if slice.len() > threshold {
            slice
                .par_iter_mut()
                .enumerate()
                .for_each(|(idx, value)| f(idx, value));
            return;
        }
    }
    #[cfg(target_arch = "wasm32")]
    let _ = threshold;

    for (idx, value) in slice.iter_mut().enumerate() {
        f(idx, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_and_parallel_agree() {
        let mut small = vec![0usize; 4];
        let mut large = vec![0usize; 4096];
        for_each_indexed_mut(&mut small, 8, |idx, value| *value = idx * 2);
        for_each_indexed_mut(&mut large, 8, |idx, value| *value = idx * 2);
        assert_eq!(small, vec![0, 2, 4, 6]);
        assert!(large.iter().enumerate().all(|(idx, value)| *value == idx * 2));
    }
}
