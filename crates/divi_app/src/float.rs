/// Returns `n` evenly spaced values spanning `[start, end]` (both ends included).
pub fn lin_range(start: f64, end: f64, n: usize) -> LinRange {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };

    LinRange {
        start,
        end,
        step,
        index: 0,
        len: n,
    }
}

pub struct LinRange {
    start: f64,
    end: f64,
    step: f64,
    len: usize,
    index: usize,
}

impl Iterator for LinRange {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        if self.index >= self.len {
            return None;
        }

        let i = self.index;
        self.index += 1;

        // Pin the final value so the range ends exactly on `end`.
        if i + 1 == self.len && i > 0 {
            return Some(self.end);
        }

        Some(self.start + self.step * i as f64)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;

        (n, Some(n))
    }
}

impl ExactSizeIterator for LinRange {}

/// Running sum of grid spacings, i.e. the positions of a grid whose
/// i-th point sits `spacing[0] + ... + spacing[i]` from the origin.
pub fn accumulate(spacing: impl IntoIterator<Item = f64>) -> Vec<f64> {
    spacing
        .into_iter()
        .scan(0.0, |total, dx| {
            *total += dx;
            Some(*total)
        })
        .collect()
}
