use ndarray::Array2;

use super::{build_rows, disk_offsets};

/// Mean over a `window x window` box, edges clamped.
///
/// Separable running sums: one pass along rows, one along columns.
pub fn box_mean(data: &Array2<f32>, window: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    if window <= 1 || h == 0 || w == 0 {
        return data.clone();
    }
    let radius = (window / 2) as isize;
    let norm = (2 * radius + 1) as f64;

    let row_pass = build_rows(h, w, |row| {
        let line: Vec<f32> = (0..w).map(|col| data[[row, col]]).collect();
        running_mean(&line, radius, norm)
    });

    let transposed = build_rows(w, h, |col| {
        let line: Vec<f32> = (0..h).map(|row| row_pass[[row, col]]).collect();
        running_mean(&line, radius, norm)
    });

    let result = transposed.reversed_axes();
    result.as_standard_layout().into_owned()
}

fn running_mean(line: &[f32], radius: isize, norm: f64) -> Vec<f32> {
    let n = line.len() as isize;
    let at = |i: isize| line[i.clamp(0, n - 1) as usize] as f64;

    let mut sum: f64 = (-radius..=radius).map(at).sum();
    let mut out = Vec::with_capacity(line.len());
    for i in 0..n {
        out.push((sum / norm) as f32);
        sum += at(i + radius + 1) - at(i - radius);
    }
    out
}

/// Majority filter over a disk of `radius` pixels, repeated `iterations` times.
///
/// Ties keep the current value when it is among the winners, otherwise the
/// smallest winning value. Used to remove speckle from tracking arrays.
pub fn mode_filter(data: &Array2<u8>, radius: usize, iterations: usize) -> Array2<u8> {
    let (h, w) = data.dim();
    if radius == 0 || h == 0 || w == 0 {
        return data.clone();
    }
    let offsets = disk_offsets(radius);
    let mut current = data.clone();

    for _ in 0..iterations {
        let src = &current;
        current = build_rows(h, w, |row| {
            let mut counts: Vec<(u8, u32)> = Vec::with_capacity(8);
            (0..w)
                .map(|col| {
                    counts.clear();
                    for &(dr, dc) in &offsets {
                        let r = row as isize + dr;
                        let c = col as isize + dc;
                        if r < 0 || r >= h as isize || c < 0 || c >= w as isize {
                            continue;
                        }
                        let v = src[[r as usize, c as usize]];
                        match counts.iter_mut().find(|(value, _)| *value == v) {
                            Some((_, n)) => *n += 1,
                            None => counts.push((v, 1)),
                        }
                    }
                    majority(&counts, src[[row, col]])
                })
                .collect()
        });
    }
    current
}

fn majority(counts: &[(u8, u32)], current: u8) -> u8 {
    let best = counts.iter().map(|&(_, n)| n).max().unwrap_or(0);
    let current_count = counts
        .iter()
        .find(|(v, _)| *v == current)
        .map(|&(_, n)| n)
        .unwrap_or(0);
    if current_count == best {
        return current;
    }
    counts
        .iter()
        .filter(|&&(_, n)| n == best)
        .map(|&(v, _)| v)
        .min()
        .unwrap_or(current)
}

/// 3x3 median filter with clamped edges.
pub fn median_filter_3x3(data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return data.clone();
    }
    build_rows(h, w, |row| {
        let mut window = [0.0f32; 9];
        (0..w)
            .map(|col| {
                let mut i = 0;
                for dr in -1..=1_isize {
                    for dc in -1..=1_isize {
                        let r = (row as isize + dr).clamp(0, h as isize - 1) as usize;
                        let c = (col as isize + dc).clamp(0, w as isize - 1) as usize;
                        window[i] = data[[r, c]];
                        i += 1;
                    }
                }
                *window.select_nth_unstable_by(4, |a, b| a.total_cmp(b)).1
            })
            .collect()
    })
}
