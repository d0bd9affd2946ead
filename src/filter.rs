//! Butterworth filter design and zero-phase (forward-backward) filtering
//!
//! Filters are designed digitally from the analog Butterworth prototype by
//! frequency transformation and the bilinear transform, producing transfer
//! function coefficients `(b, a)`. [`Butterworth::filtfilt`] runs the filter
//! forward and then backward over an odd-extended copy of the signal, which
//! cancels the phase response entirely, so gait features keep their timing.
//!
//! # Example
//! ```
//! use gait_trajectory::filter::{Butterworth, FilterKind};
//!
//! let low_pass = Butterworth::new(FilterKind::LowPass, 2, 10.0, 50.0).unwrap();
//! let signal: Vec<f64> = (0..200).map(|i| (i as f64 * 0.1).sin()).collect();
//! let filtered = low_pass.filtfilt(&signal).unwrap();
//! assert_eq!(filtered.len(), signal.len());
//! ```

use core::f64::consts::PI;

use nalgebra::{Complex, DMatrix, DVector};

use crate::error::{Error, Result};

/// Frequency response shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
}

/// A cutoff frequency in Hz
///
/// Accepts any scalar form, including single-element containers, so
/// that values read from tables can be passed straight through.
///
/// # Example
/// ```
/// use gait_trajectory::filter::Frequency;
///
/// assert_eq!(Frequency::from(0.4).hz(), 0.4);
/// assert_eq!(Frequency::from([10.0]).hz(), 10.0);
/// assert_eq!(Frequency::from(3u32).hz(), 3.0);
///
/// let column = vec![1.5];
/// assert_eq!(Frequency::try_from(column.as_slice()).unwrap().hz(), 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Frequency(f64);

impl Frequency {
    pub fn hz(self) -> f64 {
        self.0
    }
}

impl From<f64> for Frequency {
    fn from(value: f64) -> Self {
        Frequency(value)
    }
}

impl From<f32> for Frequency {
    fn from(value: f32) -> Self {
        Frequency(value as f64)
    }
}

impl From<u32> for Frequency {
    fn from(value: u32) -> Self {
        Frequency(value as f64)
    }
}

impl From<i32> for Frequency {
    fn from(value: i32) -> Self {
        Frequency(value as f64)
    }
}

impl From<[f64; 1]> for Frequency {
    fn from(value: [f64; 1]) -> Self {
        Frequency(value[0])
    }
}

impl TryFrom<&[f64]> for Frequency {
    type Error = Error;

    fn try_from(values: &[f64]) -> Result<Self> {
        match values {
            [value] => Ok(Frequency(*value)),
            _ => Err(Error::invalid(
                "cutoff",
                values.len() as f64,
                "expected exactly one cutoff value",
            )),
        }
    }
}

/// Digital Butterworth filter in transfer function form
#[derive(Debug, Clone, PartialEq)]
pub struct Butterworth {
    /// Numerator coefficients, highest power first
    b: Vec<f64>,
    /// Denominator coefficients, normalized so that `a[0] == 1`
    a: Vec<f64>,
}

impl Butterworth {
    /// Design a filter of the given order and cutoff for a signal sampled at `sample_rate` Hz
    ///
    /// The cutoff is normalized by the Nyquist frequency and must lie strictly
    /// between 0 and Nyquist.
    pub fn new(
        kind: FilterKind,
        order: usize,
        cutoff: impl Into<Frequency>,
        sample_rate: f64,
    ) -> Result<Self> {
        let cutoff = cutoff.into().hz();

        if !(cutoff.is_finite() && cutoff > 0.0) {
            return Err(Error::invalid("cutoff", cutoff, "cutoff frequency must be greater than 0"));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::invalid("sample_rate", sample_rate, "must be finite and greater than 0"));
        }
        if order == 0 {
            return Err(Error::invalid("order", 0.0, "filter order must be at least 1"));
        }

        let normalized = cutoff / (0.5 * sample_rate);
        if normalized >= 1.0 {
            return Err(Error::invalid("cutoff", cutoff, "cutoff frequency must be below Nyquist"));
        }

        // Bilinear transform with fs = 2 on the normalized frequency axis
        let fs2 = 4.0;
        let warped = fs2 * (PI * normalized / 2.0).tan();

        // Analog prototype, poles on the left half of the unit circle
        let prototype: Vec<Complex<f64>> = (0..order)
            .map(|k| {
                let m = 2 * k as i64 - (order as i64 - 1);
                let angle = PI * m as f64 / (2 * order) as f64;
                -Complex::new(angle.cos(), angle.sin())
            })
            .collect();

        let (zeros, poles, gain) = match kind {
            FilterKind::LowPass => {
                let poles: Vec<_> = prototype.iter().map(|p| *p * warped).collect();
                (Vec::new(), poles, warped.powi(order as i32))
            }
            FilterKind::HighPass => {
                let poles: Vec<_> = prototype.iter().map(|p| real(warped) / *p).collect();
                let product = prototype
                    .iter()
                    .fold(real(1.0), |acc, p| acc * -*p);
                let zeros = vec![real(0.0); order];
                (zeros, poles, (real(1.0) / product).re)
            }
        };

        let numerator = zeros
            .iter()
            .fold(real(1.0), |acc, z| acc * (real(fs2) - *z));
        let denominator = poles
            .iter()
            .fold(real(1.0), |acc, p| acc * (real(fs2) - *p));
        let digital_gain = gain * (numerator / denominator).re;

        let mut digital_zeros: Vec<_> = zeros.iter().map(|z| (real(fs2) + *z) / (real(fs2) - *z)).collect();
        digital_zeros.resize(order, real(-1.0));
        let digital_poles: Vec<_> = poles.iter().map(|p| (real(fs2) + *p) / (real(fs2) - *p)).collect();

        let b = poly(&digital_zeros)
            .into_iter()
            .map(|c| c * digital_gain)
            .collect();
        let a = poly(&digital_poles);

        Ok(Self { b, a })
    }

    /// Build a filter from explicit transfer function coefficients
    ///
    /// `a[0]` must be non-zero; coefficients are normalized by it.
    pub fn from_coefficients(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        let a0 = a.first().copied().unwrap_or(0.0);
        if a0 == 0.0 || b.is_empty() {
            return Err(Error::FilterDesign("leading denominator coefficient must be non-zero"));
        }
        let len = b.len().max(a.len());
        let mut b: Vec<f64> = b.iter().map(|c| c / a0).collect();
        let mut a: Vec<f64> = a.iter().map(|c| c / a0).collect();
        b.resize(len, 0.0);
        a.resize(len, 0.0);
        Ok(Self { b, a })
    }

    /// Numerator coefficients
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Denominator coefficients
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Default edge padding of [`filtfilt`](Self::filtfilt): three times the number of taps
    pub fn default_padlen(&self) -> usize {
        3 * self.b.len().max(self.a.len())
    }

    /// Zero-phase filtering with the default edge padding
    pub fn filtfilt(&self, signal: &[f64]) -> Result<Vec<f64>> {
        self.filtfilt_padded(signal, self.default_padlen())
    }

    /// Zero-phase filtering with `padlen` odd-extended samples at each end
    ///
    /// The signal must be longer than `padlen`.
    pub fn filtfilt_padded(&self, signal: &[f64], padlen: usize) -> Result<Vec<f64>> {
        if signal.len() <= padlen {
            return Err(Error::SeriesTooShort {
                len: signal.len(),
                required: padlen + 1,
            });
        }

        let zi = self.steady_state()?;
        let extended = odd_extension(signal, padlen);

        let initial: Vec<f64> = zi.iter().map(|z| z * extended[0]).collect();
        let mut forward = self.lfilter(&extended, &initial);

        forward.reverse();
        let initial: Vec<f64> = zi.iter().map(|z| z * forward[0]).collect();
        let mut output = self.lfilter(&forward, &initial);
        output.reverse();

        Ok(output[padlen..output.len() - padlen].to_vec())
    }

    /// Single forward pass in direct form II transposed, starting from state `zi`
    pub fn lfilter(&self, signal: &[f64], zi: &[f64]) -> Vec<f64> {
        let taps = self.b.len();
        let mut state = zi.to_vec();
        state.resize(taps - 1, 0.0);

        signal
            .iter()
            .map(|&x| {
                if taps == 1 {
                    return self.b[0] * x;
                }
                let y = self.b[0] * x + state[0];
                for i in 0..taps - 2 {
                    state[i] = self.b[i + 1] * x + state[i + 1] - self.a[i + 1] * y;
                }
                state[taps - 2] = self.b[taps - 1] * x - self.a[taps - 1] * y;
                y
            })
            .collect()
    }

    /// Filter state for the steady-state step response
    ///
    /// Scaling it by the first input sample starts the filter as if that
    /// value had been applied forever, suppressing the start-up transient.
    pub fn steady_state(&self) -> Result<Vec<f64>> {
        let n = self.b.len() - 1;
        if n == 0 {
            return Ok(Vec::new());
        }

        // (I - companion(a)^T) zi = b[1..] - a[1..] * b[0]
        let system = DMatrix::from_fn(n, n, |row, col| {
            let identity = if row == col { 1.0 } else { 0.0 };
            let first_column = if col == 0 { self.a[row + 1] } else { 0.0 };
            let super_diagonal = if col == row + 1 { 1.0 } else { 0.0 };
            identity + first_column - super_diagonal
        });
        let rhs = DVector::from_fn(n, |row, _| self.b[row + 1] - self.a[row + 1] * self.b[0]);

        system
            .lu()
            .solve(&rhs)
            .map(|zi| zi.iter().copied().collect())
            .ok_or(Error::FilterDesign("singular steady-state system"))
    }
}

fn real(value: f64) -> Complex<f64> {
    Complex::new(value, 0.0)
}

/// Polynomial coefficients (highest power first) with the given roots, real part
fn poly(roots: &[Complex<f64>]) -> Vec<f64> {
    let mut coefficients = vec![real(1.0)];
    for root in roots {
        let mut next = coefficients.clone();
        next.push(real(0.0));
        for i in 1..next.len() {
            next[i] -= *root * coefficients[i - 1];
        }
        coefficients = next;
    }
    coefficients.into_iter().map(|c| c.re).collect()
}

/// Extend a signal by point reflection about both end samples
fn odd_extension(signal: &[f64], padlen: usize) -> Vec<f64> {
    let first = signal[0];
    let last = signal[signal.len() - 1];
    let len = signal.len();

    let mut extended = Vec::with_capacity(len + 2 * padlen);
    extended.extend((1..=padlen).rev().map(|i| 2.0 * first - signal[i]));
    extended.extend_from_slice(signal);
    extended.extend((1..=padlen).map(|i| 2.0 * last - signal[len - 1 - i]));
    extended
}
