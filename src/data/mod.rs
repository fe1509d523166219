//! Dataset helpers: image decoding, pattern-folder loading and label encoding.

pub mod image;
pub mod patterns;

pub use self::image::{image_bytes_to_grayscale_input, load_grayscale};
pub use self::patterns::{load_pattern_folders, PatternSet};

/// Output labels of the 62-class pattern recognition model, in class order.
pub const PATTERN_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Vector of `size` zeros with a `1.0` at `index`.
///
/// # Panics
/// If `index >= size`.
pub fn one_hot(size: usize, index: usize) -> Vec<f64> {
    let mut v = vec![0.0; size];
    v[index] = 1.0;
    v
}

/// Index of the largest value; the first one wins on ties. `0` for an empty slice.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .fold(0, |best, (i, &x)| if x > v[best] { i } else { best })
}

/// Index of the smallest value; the first one wins on ties. `0` for an empty slice.
pub fn argmin(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .fold(0, |best, (i, &x)| if x < v[best] { i } else { best })
}

/// One label per character of [`PATTERN_ALPHABET`].
pub fn pattern_labels() -> Vec<String> {
    PATTERN_ALPHABET.chars().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_hot_sets_single_index() {
        assert_eq!(one_hot(4, 2), vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    #[should_panic]
    fn one_hot_index_out_of_range_panics() {
        one_hot(3, 3);
    }

    #[test]
    fn argmax_argmin_prefer_first() {
        assert_eq!(argmax(&[0.1, 0.9, 0.9, 0.2]), 1);
        assert_eq!(argmin(&[0.5, -1.0, 3.0, -1.0]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn alphabet_has_62_labels() {
        let labels = pattern_labels();
        assert_eq!(labels.len(), 62);
        assert_eq!(labels[10], "A");
        assert_eq!(labels[61], "z");
    }
}
