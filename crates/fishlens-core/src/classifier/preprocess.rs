//! Image preprocessing for ImageNet-style classifiers.
//!
//! Expected input:
//! - Square `image_size × image_size`, center-cropped after resizing
//! - Channel order: RGB
//! - Normalization: (pixel/255 - mean[c]) / std[c]
//! - Tensor layout: NCHW [batch, channels, height, width]

use image::DynamicImage;
use ndarray::Array4;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// Resize (cover + center crop), normalize, and lay out as an NCHW tensor.
pub fn preprocess(
    image: &DynamicImage,
    image_size: u32,
    mean: [f32; 3],
    std: [f32; 3],
) -> Array4<f32> {
    let resized = image.resize_to_fill(
        image_size,
        image_size,
        image::imageops::FilterType::Triangle,
    );
    let rgb = resized.to_rgb8();

    let size = image_size as usize;
    let plane = size * size;
    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, size, size));

    // Write the raw slice directly instead of indexing the 4D array per pixel.
    let tensor_data = tensor
        .as_slice_mut()
        .expect("freshly allocated array is contiguous");
    for (i, pixel) in rgb.as_raw().chunks_exact(CHANNELS).enumerate() {
        for (c, &val) in pixel.iter().enumerate() {
            // NCHW layout: offset = c * size * size + y * size + x
            tensor_data[c * plane + i] = (val as f32 / 255.0 - mean[c]) / std[c];
        }
    }

    tensor
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}
