//! MNIST dataset loader for training and testing.
//!
//! Reads images and labels from the IDX file format used by MNIST. Pixel
//! values are scaled to the 0.0 to 1.0 range and labels are one-hot encoded,
//! ready to feed a network.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const IMAGE_MAGIC_NUMBER: u32 = 2051;
pub const LABEL_MAGIC_NUMBER: u32 = 2049;
pub const INPUT_NODES: usize = 784;
pub const OUTPUT_NODES: usize = 10;

/// Errors that can occur while handling MNIST data
#[derive(Debug, Error)]
pub enum MnistError {
    /// Wrapper for standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error for invalid magic numbers in MNIST files
    #[error("Invalid magic number for {kind} file: expected {expected}, got {actual}")]
    InvalidMagicNumber {
        kind: &'static str,
        expected: u32,
        actual: u32,
    },
    /// Error for mismatches between images and labels
    #[error("Data mismatch: {0}")]
    DataMismatch(String),
    /// Error for invalid image dimensions
    #[error(
        "Invalid image dimensions: expected {expected} pixels, got {actual} pixels ({rows}x{cols})"
    )]
    InvalidDimensions {
        expected: usize,
        actual: usize,
        rows: usize,
        cols: usize,
    },
    /// Error for label bytes outside the class range
    #[error("Invalid label {label}: expected a class index below {classes}")]
    InvalidLabel { label: u8, classes: usize },
}

/// Container for MNIST dataset pairs (images and their corresponding labels)
#[derive(Debug)]
pub struct MnistData {
    images: Vec<Vec<f64>>,
    labels: Vec<Vec<f64>>,
}

impl MnistData {
    /// Creates a new MnistData instance from paired images and labels.
    ///
    /// # Arguments
    /// * `images` - Flattened images with pixel values in 0.0 to 1.0
    /// * `labels` - One-hot encoded labels
    ///
    /// # Returns
    /// * `Ok(MnistData)` if the number of images matches the number of labels
    /// * `Err(MnistError::DataMismatch)` if there's a mismatch between images and labels
    ///
    /// # Example
    /// ```
    /// use mnist::{one_hot, MnistData, INPUT_NODES, OUTPUT_NODES};
    ///
    /// # fn main() -> Result<(), mnist::MnistError> {
    /// let images = vec![vec![0.5; INPUT_NODES]];
    /// let labels = vec![one_hot(1, OUTPUT_NODES)?];
    /// let mnist_data = MnistData::new(images, labels)?;
    /// assert_eq!(mnist_data.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(images: Vec<Vec<f64>>, labels: Vec<Vec<f64>>) -> Result<Self, MnistError> {
        if images.len() != labels.len() {
            return Err(MnistError::DataMismatch(format!(
                "Number of images ({}) does not match number of labels ({})",
                images.len(),
                labels.len()
            )));
        }
        Ok(Self { images, labels })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[Vec<f64>] {
        &self.images
    }

    pub fn labels(&self) -> &[Vec<f64>] {
        &self.labels
    }
}

/// One-hot encodes `label` over `classes` classes.
///
/// # Example
/// ```
/// use mnist::one_hot;
///
/// # fn main() -> Result<(), mnist::MnistError> {
/// assert_eq!(one_hot(2, 4)?, vec![0.0, 0.0, 1.0, 0.0]);
/// # Ok(())
/// # }
/// ```
pub fn one_hot(label: u8, classes: usize) -> Result<Vec<f64>, MnistError> {
    if label as usize >= classes {
        return Err(MnistError::InvalidLabel { label, classes });
    }
    let mut encoded = vec![0.0; classes];
    encoded[label as usize] = 1.0;
    Ok(encoded)
}

/// Creates a progress bar style with a consistent look
pub(crate) fn create_progress_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap()
        .progress_chars("##-")
}

/// Reads a 32-bit unsigned integer in big-endian format from a file
fn read_u32(file: &mut File) -> std::io::Result<u32> {
    let mut buffer = [0; 4];
    file.read_exact(&mut buffer)?;
    Ok(u32::from_be_bytes(buffer))
}

/// Reads MNIST image data from an IDX file format.
///
/// # Arguments
/// * `path` - Path to the MNIST image file
/// * `progress` - Progress bar for tracking loading progress
///
/// # Returns
/// * `Ok(Vec<Vec<f64>>)` containing flattened images with pixel values scaled to 0.0-1.0
/// * `Err(MnistError)` if file reading fails or format is invalid
///
/// # Format
/// The IDX file format consists of:
/// * 32-bit magic number (2051)
/// * 32-bit number of images
/// * 32-bit number of rows
/// * 32-bit number of columns
/// * Pixels in row-major order (1 byte per pixel)
pub fn read_mnist_images(
    path: impl AsRef<Path>,
    progress: &ProgressBar,
) -> Result<Vec<Vec<f64>>, MnistError> {
    let mut file = File::open(path)?;

    let magic_number = read_u32(&mut file)?;
    if magic_number != IMAGE_MAGIC_NUMBER {
        return Err(MnistError::InvalidMagicNumber {
            kind: "images",
            expected: IMAGE_MAGIC_NUMBER,
            actual: magic_number,
        });
    }

    let num_images = read_u32(&mut file)? as usize;
    let num_rows = read_u32(&mut file)? as usize;
    let num_cols = read_u32(&mut file)? as usize;
    let pixels_per_image = num_rows * num_cols;

    if pixels_per_image != INPUT_NODES {
        return Err(MnistError::InvalidDimensions {
            expected: INPUT_NODES,
            actual: pixels_per_image,
            rows: num_rows,
            cols: num_cols,
        });
    }

    progress.set_length(num_images as u64);
    progress.set_message("Loading images...");

    let mut images = Vec::with_capacity(num_images);
    let mut buffer = vec![0u8; pixels_per_image];

    for _ in 0..num_images {
        file.read_exact(&mut buffer)?;
        let data = Vec::from_iter(buffer.iter().map(|&pixel| f64::from(pixel) / 255.0));
        images.push(data);
        progress.inc(1);
    }

    progress.finish_with_message("Images loaded successfully");
    Ok(images)
}

/// Reads MNIST label data from an IDX file format.
///
/// # Arguments
/// * `path` - Path to the MNIST label file
/// * `progress` - Progress bar for tracking loading progress
///
/// # Returns
/// * `Ok(Vec<Vec<f64>>)` containing one-hot encoded labels
/// * `Err(MnistError)` if file reading fails, the format is invalid, or a
///   label byte is not a digit
///
/// # Format
/// The IDX file format consists of:
/// * 32-bit magic number (2049)
/// * 32-bit number of labels
/// * Labels (1 byte per label)
pub fn read_mnist_labels(
    path: impl AsRef<Path>,
    progress: &ProgressBar,
) -> Result<Vec<Vec<f64>>, MnistError> {
    let mut file = File::open(path)?;

    let magic_number = read_u32(&mut file)?;
    if magic_number != LABEL_MAGIC_NUMBER {
        return Err(MnistError::InvalidMagicNumber {
            kind: "labels",
            expected: LABEL_MAGIC_NUMBER,
            actual: magic_number,
        });
    }

    let num_labels = read_u32(&mut file)? as usize;
    progress.set_length(num_labels as u64);
    progress.set_message("Loading labels...");

    let mut labels = Vec::with_capacity(num_labels);
    let mut buffer = [0u8; 1];

    for _ in 0..num_labels {
        file.read_exact(&mut buffer)?;
        labels.push(one_hot(buffer[0], OUTPUT_NODES)?);
        progress.inc(1);
    }

    progress.finish_with_message("Labels loaded successfully");
    Ok(labels)
}

/// Loads the standard MNIST training dataset from `data_dir`
pub fn load_training_data(data_dir: impl AsRef<Path>) -> Result<MnistData, MnistError> {
    let data_dir = data_dir.as_ref();
    load_mnist_data(
        data_dir.join("train-images-idx3-ubyte"),
        data_dir.join("train-labels-idx1-ubyte"),
    )
}

/// Loads the standard MNIST test dataset from `data_dir`
pub fn load_test_data(data_dir: impl AsRef<Path>) -> Result<MnistData, MnistError> {
    let data_dir = data_dir.as_ref();
    load_mnist_data(
        data_dir.join("t10k-images-idx3-ubyte"),
        data_dir.join("t10k-labels-idx1-ubyte"),
    )
}

/// Loads MNIST images and labels from the specified file paths.
///
/// # Arguments
/// * `images_path` - Path to the images file
/// * `labels_path` - Path to the labels file
///
/// # Returns
/// * `Ok(MnistData)` containing paired images and labels
/// * `Err(MnistError)` if loading fails
pub fn load_mnist_data(
    images_path: PathBuf,
    labels_path: PathBuf,
) -> Result<MnistData, MnistError> {
    let multi_progress = indicatif::MultiProgress::new();
    let style = create_progress_style(
        "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
    );

    let images_progress = multi_progress.add(ProgressBar::new(0));
    let labels_progress = multi_progress.add(ProgressBar::new(0));
    images_progress.set_style(style.clone());
    labels_progress.set_style(style);

    let images = read_mnist_images(images_path, &images_progress)?;
    let labels = read_mnist_labels(labels_path, &labels_progress)?;

    MnistData::new(images, labels)
}
