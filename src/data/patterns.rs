use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::data::image::load_grayscale;
use crate::data::one_hot;
use crate::error::{MlpError, Result};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Images and one-hot targets loaded from a pattern folder tree.
#[derive(Debug, Clone)]
pub struct PatternSet {
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<Vec<f64>>,
    /// Folder name of each class, in target index order.
    pub class_names: Vec<String>,
}

impl PatternSet {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Loads `root/<class>/<sample>.<ext>`.
///
/// Class folders must have numeric names (`1`, `2`, ... `62`) and are
/// ordered numerically; class `k` in that order gets target `one_hot(n, k)`.
/// Samples are ordered by numeric file stem, then by name. Every image is
/// resized to `width × height` grayscale.
pub fn load_pattern_folders(root: impl AsRef<Path>, width: u32, height: u32) -> Result<PatternSet> {
    let root = root.as_ref();

    let mut classes: Vec<(u64, PathBuf)> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter_map(|path| numeric_name(&path).map(|n| (n, path)))
        .collect();
    classes.sort_by_key(|(n, _)| *n);

    if classes.is_empty() {
        return Err(MlpError::invalid(format!(
            "no numbered class folders found in {}",
            root.display()
        )));
    }

    let n_classes = classes.len();
    let mut set = PatternSet {
        inputs: Vec::new(),
        targets: Vec::new(),
        class_names: classes.iter().map(|(n, _)| n.to_string()).collect(),
    };

    for (class_index, (_, dir)) in classes.iter().enumerate() {
        let samples = image_files(dir)?;
        if samples.is_empty() {
            warn!(folder = %dir.display(), "class folder has no images");
        }
        for sample in &samples {
            set.inputs.push(load_grayscale(sample, width, height)?);
            set.targets.push(one_hot(n_classes, class_index));
        }
        info!(folder = %dir.display(), samples = samples.len(), "loaded pattern folder {}/{}", class_index + 1, n_classes);
    }

    Ok(set)
}

/// Image files directly inside `dir`, ordered by numeric stem then name.
pub fn image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_image_extension(path))
        .collect();
    files.sort_by(|a, b| {
        numeric_stem(a)
            .cmp(&numeric_stem(b))
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn numeric_name(path: &Path) -> Option<u64> {
    path.file_name()?.to_str()?.parse().ok()
}

// Non-numeric stems sort after numeric ones.
fn numeric_stem(path: &Path) -> u64 {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{GrayImage, Luma};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vanilla-mlp-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_classes_in_numeric_order() {
        let root = scratch_dir("patterns");
        for (class, shade) in [("2", 255u8), ("10", 0u8), ("1", 128u8)] {
            let dir = root.join(class);
            fs::create_dir_all(&dir).unwrap();
            for sample in ["1", "2"] {
                GrayImage::from_pixel(3, 3, Luma([shade]))
                    .save(dir.join(format!("{}.png", sample)))
                    .unwrap();
            }
        }
        fs::write(root.join("1").join("notes.txt"), "ignored").unwrap();
        fs::create_dir_all(root.join("misc")).unwrap();

        let set = load_pattern_folders(&root, 3, 3).unwrap();
        assert_eq!(set.class_names, vec!["1", "2", "10"]);
        assert_eq!(set.len(), 6);
        assert_eq!(set.targets[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(set.targets[2], vec![0.0, 1.0, 0.0]);
        assert_eq!(set.targets[5], vec![0.0, 0.0, 1.0]);
        assert!(set.inputs[2].iter().all(|&x| x == 1.0));
        assert!(set.inputs[4].iter().all(|&x| x == 0.0));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn empty_root_is_an_error() {
        let root = scratch_dir("empty");
        assert!(load_pattern_folders(&root, 3, 3).is_err());
        fs::remove_dir_all(&root).unwrap();
    }
}
