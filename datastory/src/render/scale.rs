//! Linear scales with "nice" domains and 1/2/5 tick steps.

/// Affine map from a data domain onto a pixel range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// Create a scale. A zero-width domain is widened so `map` stays finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain: widen_degenerate(domain),
            range,
        }
    }

    /// Domain after widening.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Output range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Extend the domain outward to round tick steps.
    pub fn nice(mut self, count: usize) -> Self {
        self.domain = nice_domain(self.domain, count);
        self
    }

    /// Map a domain value into the range. Values outside the domain extrapolate.
    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        // Halved so domains near ±f64::MAX keep a finite width.
        r0 + (v / 2.0 - d0 / 2.0) / (d1 / 2.0 - d0 / 2.0) * (r1 - r0)
    }

    /// Round tick values covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }

    /// Step between consecutive ticks for `count`.
    pub fn tick_step(&self, count: usize) -> f64 {
        tick_step(self.domain.0, self.domain.1, count)
    }
}

/// `(min, max)` over finite values; `None` for an empty input.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn widen_degenerate((lo, hi): (f64, f64)) -> (f64, f64) {
    if lo < hi {
        return (lo, hi);
    }
    if lo > hi {
        return (hi, lo);
    }
    let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
    (lo - pad, hi + pad)
}

/// Step of roughly `(stop - start) / count`, snapped to 1, 2 or 5 times a power of ten.
pub(crate) fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let raw = (stop / 2.0 - start / 2.0).abs() / count.max(1) as f64 * 2.0;
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

pub(crate) fn nice_domain((mut lo, mut hi): (f64, f64), count: usize) -> (f64, f64) {
    let mut prev_step = f64::NAN;
    for _ in 0..10 {
        let step = tick_step(lo, hi, count);
        if step == prev_step {
            break;
        }
        let (nlo, nhi) = ((lo / step).floor() * step, (hi / step).ceil() * step);
        if !nlo.is_finite() || !nhi.is_finite() {
            break;
        }
        (lo, hi) = (nlo, nhi);
        prev_step = step;
    }
    (lo, hi)
}

/// Upper bound on ticks per requested tick, past which no ticks are produced.
const MAX_TICKS_PER_COUNT: i64 = 10;

pub(crate) fn ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    let step = tick_step(lo, hi, count);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    let limit = (count.max(1) as i64).saturating_mul(MAX_TICKS_PER_COUNT);
    if last.saturating_sub(first) > limit {
        return Vec::new();
    }
    let decimals = step_decimals(step);
    (first..=last)
        .map(|i| round_to(i as f64 * step, decimals))
        .collect()
}

/// Decimal places needed to print multiples of `step` exactly.
pub(crate) fn step_decimals(step: f64) -> usize {
    if step >= 1.0 || step <= 0.0 || !step.is_finite() {
        0
    } else {
        (-step.log10().floor()) as usize
    }
}

fn round_to(v: f64, decimals: usize) -> f64 {
    let m = 10f64.powi(decimals as i32);
    (v * m).round() / m
}

/// Tick label for `v` given the tick `step`.
pub fn format_tick(v: f64, step: f64) -> String {
    let decimals = step_decimals(step);
    let s = format!("{v:.decimals$}");
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_owned()
    } else {
        s
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scale.rs"]
mod tests;
