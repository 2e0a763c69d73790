/// First index whose key is `>= value`, or `items.len()` if none.
///
/// Keys must be non-decreasing over `items`.
pub fn lower_bound<T, F>(items: &[T], value: f64, key: F) -> usize
where
    F: Fn(&T) -> f64,
{
    let mut lo = 0usize;
    let mut hi = items.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if key(&items[mid]) < value {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Adjacent pair `(i, i + 1)` bracketing `value`.
///
/// Values outside the key range clamp to the first or last pair. Returns
/// `None` for fewer than two items.
pub fn find_bounding_indices<T, F>(items: &[T], value: f64, key: F) -> Option<(usize, usize)>
where
    F: Fn(&T) -> f64,
{
    if items.len() < 2 {
        return None;
    }
    let upper = lower_bound(items, value, key).clamp(1, items.len() - 1);
    Some((upper - 1, upper))
}

/// Number of samples `uniform_sample` takes over `[from, to]`.
pub fn sample_count(from: f64, to: f64, resolution: f64) -> usize {
    let span = ((to - from) * resolution).floor();
    if span.is_finite() && span > 2.0 {
        span as usize
    } else {
        2
    }
}

/// Calls `f(at, t)` at evenly spaced points spanning `[from, to]`.
///
/// `resolution` is samples per unit of span; both end points are always
/// visited.
pub fn uniform_sample<F>(from: f64, to: f64, resolution: f64, mut f: F)
where
    F: FnMut(f64, f64),
{
    let count = sample_count(from, to, resolution);
    let last = (count - 1) as f64;
    for i in 0..count {
        let t = i as f64 / last;
        f(from + (to - from) * t, t);
    }
}

pub fn uniform_sample_map<R, F>(from: f64, to: f64, resolution: f64, mut f: F) -> Vec<R>
where
    F: FnMut(f64, f64) -> R,
{
    let mut out = Vec::with_capacity(sample_count(from, to, resolution));
    uniform_sample(from, to, resolution, |at, t| out.push(f(at, t)));
    out
}

/// Splits `items` into sections at strict items.
///
/// A strict item ends one section and starts the next, so both sections
/// share it. The first item never splits. An empty slice yields no
/// sections.
pub fn split_by_strict<T, F>(items: &[T], is_strict: F) -> Vec<&[T]>
where
    F: Fn(&T) -> bool,
{
    if items.is_empty() {
        return Vec::new();
    }
    let mut sections = Vec::new();
    let mut start = 0;
    for (i, item) in items.iter().enumerate().skip(1) {
        if i + 1 < items.len() && is_strict(item) {
            sections.push(&items[start..=i]);
            start = i;
        }
    }
    sections.push(&items[start..]);
    sections
}
