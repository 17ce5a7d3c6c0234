//! One-dimensional signal helpers for the row intensity profile.

use image::GrayImage;

/// Mean pixel intensity of every row, top to bottom.
pub fn row_intensity_profile(gray: &GrayImage) -> Vec<f32> {
    let (width, height) = gray.dimensions();
    if width == 0 {
        return vec![0.0; height as usize];
    }

    gray.rows()
        .map(|row| row.map(|p| p[0] as u32).sum::<u32>() as f32 / width as f32)
        .collect()
}

/// Centred moving average with zero padding outside the signal.
///
/// Output has the same length as the input, matching a "same"-mode
/// convolution with a uniform kernel.
pub fn smooth_profile(signal: &[f32], window: usize) -> Vec<f32> {
    if window <= 1 || signal.is_empty() {
        return signal.to_vec();
    }

    let n = signal.len() as isize;
    let half = ((window - 1) / 2) as isize;

    (0..n)
        .map(|i| {
            let sum: f32 = (0..window as isize)
                .map(|j| i + half - j)
                .filter(|&idx| idx >= 0 && idx < n)
                .map(|idx| signal[idx as usize])
                .sum();
            sum / window as f32
        })
        .collect()
}

/// Central-difference gradient, one-sided at both ends.
pub fn gradient(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|i| {
                if i == 0 {
                    signal[1] - signal[0]
                } else if i == n - 1 {
                    signal[n - 1] - signal[n - 2]
                } else {
                    (signal[i + 1] - signal[i - 1]) / 2.0
                }
            })
            .collect(),
    }
}

/// Population standard deviation.
pub fn std_dev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
    var.sqrt()
}

/// Finds local maxima with a minimum spacing and prominence.
///
/// Flat peaks resolve to the middle of their plateau (rounded down). Peaks
/// closer than `min_distance` to a higher peak are dropped, highest first.
/// Signal edges are never peaks.
pub fn find_peaks(signal: &[f32], min_distance: usize, min_prominence: f32) -> Vec<usize> {
    let candidates = local_maxima(signal);
    let spaced = enforce_distance(signal, &candidates, min_distance);

    spaced
        .into_iter()
        .filter(|&p| prominence(signal, p) >= min_prominence)
        .collect()
}

fn local_maxima(signal: &[f32]) -> Vec<usize> {
    let n = signal.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }

    let mut i = 1;
    while i < n - 1 {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                let right = ahead - 1;
                peaks.push((i + right) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }

    peaks
}

fn enforce_distance(signal: &[f32], peaks: &[usize], min_distance: usize) -> Vec<usize> {
    if min_distance <= 1 || peaks.len() < 2 {
        return peaks.to_vec();
    }

    // Highest peaks claim their neighbourhood first; ties keep the later peak
    let mut by_height: Vec<usize> = (0..peaks.len()).collect();
    by_height.sort_by(|&a, &b| {
        signal[peaks[a]]
            .total_cmp(&signal[peaks[b]])
            .then(a.cmp(&b))
    });

    let mut keep = vec![true; peaks.len()];
    for &idx in by_height.iter().rev() {
        if !keep[idx] {
            continue;
        }
        let mut k = idx;
        while k > 0 && peaks[idx] - peaks[k - 1] < min_distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = idx + 1;
        while k < peaks.len() && peaks[k] - peaks[idx] < min_distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

/// Height of a peak above the higher of its two surrounding minima.
pub fn prominence(signal: &[f32], peak: usize) -> f32 {
    let height = signal[peak];

    let mut left_min = height;
    for &v in signal[..=peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &signal[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    #[test]
    fn test_row_intensity_profile() {
        let gray: GrayImage = ImageBuffer::from_fn(4, 3, |x, y| Luma([(y * 10 + x) as u8]));
        let profile = row_intensity_profile(&gray);
        assert_eq!(profile, vec![1.5, 11.5, 21.5]);
    }

    #[test]
    fn test_smooth_profile_zero_pads_edges() {
        let smoothed = smooth_profile(&[3.0, 3.0, 3.0, 3.0], 3);
        assert_eq!(smoothed, vec![2.0, 3.0, 3.0, 2.0]);
    }

    #[test]
    fn test_smooth_profile_spreads_single_row() {
        let smoothed = smooth_profile(&[0.0, 0.0, 45.0, 0.0, 0.0], 3);
        assert_eq!(smoothed, vec![0.0, 15.0, 15.0, 15.0, 0.0]);
    }

    #[test]
    fn test_gradient() {
        let g = gradient(&[0.0, 1.0, 4.0, 9.0]);
        assert_eq!(g, vec![1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn test_find_peaks_plateau_midpoint() {
        let signal = [0.0, 5.0, 5.0, 5.0, 0.0];
        assert_eq!(find_peaks(&signal, 1, 0.0), vec![2]);
    }

    #[test]
    fn test_find_peaks_ignores_edges() {
        let signal = [9.0, 1.0, 4.0, 1.0, 9.0];
        assert_eq!(find_peaks(&signal, 1, 0.0), vec![2]);
    }

    #[test]
    fn test_find_peaks_prominence_filter() {
        // Small ripple on a plateau between two big peaks
        let signal = [0.0, 50.0, 20.0, 22.0, 20.0, 50.0, 0.0];
        assert_eq!(find_peaks(&signal, 1, 5.0), vec![1, 5]);
        assert_eq!(find_peaks(&signal, 1, 1.0), vec![1, 3, 5]);
    }

    #[test]
    fn test_find_peaks_distance_keeps_highest() {
        let mut signal = vec![0.0; 30];
        signal[10] = 30.0;
        signal[14] = 40.0;
        signal[25] = 20.0;
        assert_eq!(find_peaks(&signal, 10, 5.0), vec![14, 25]);
    }

    #[test]
    fn test_prominence() {
        let signal = [0.0, 10.0, 4.0, 7.0, 2.0, 12.0, 0.0];
        assert_eq!(prominence(&signal, 1), 8.0);
        assert_eq!(prominence(&signal, 3), 3.0);
        assert_eq!(prominence(&signal, 5), 12.0);
    }
}
