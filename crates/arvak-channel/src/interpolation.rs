//! Interpolation of measured noise parameters across U3 angles.
//!
//! Given samples `(theta, phi, lambda)_k -> p_k in R^m`, builds a
//! per-parameter interpolator and evaluates it at a target angle. The
//! angle is reduced to a single scalar coordinate (arc-length along the
//! sample path) so the same 1-D model machinery serves average, linear,
//! polynomial and exponential fits.

use crate::error::{ChannelError, ChannelResult};

/// A U3 angle triple `(theta, phi, lambda)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct U3Angle {
    /// Polar rotation angle.
    pub theta: f64,
    /// First phase angle.
    pub phi: f64,
    /// Second phase angle.
    pub lambda: f64,
}

impl U3Angle {
    /// Construct a U3 angle triple.
    pub fn new(theta: f64, phi: f64, lambda: f64) -> Self {
        Self { theta, phi, lambda }
    }

    fn coordinate(&self) -> f64 {
        // Arbitrary but consistent scalar ordering of angle triples; any
        // monotone embedding works since the models below only need a
        // total order plus distances for polynomial/exponential fits.
        self.theta + self.phi + self.lambda
    }
}

/// One interpolation sample: an angle and the measured parameter vector at
/// that angle.
#[derive(Debug, Clone)]
pub struct Sample {
    /// The U3 angle this sample was measured at.
    pub angle: U3Angle,
    /// Measured parameter vector `p_k in R^m`.
    pub parameters: Vec<f64>,
}

/// Interpolation model selection.
#[derive(Debug, Clone, Copy)]
pub enum InterpolationModel {
    /// Average of all samples, ignoring the target angle.
    Average,
    /// Linear least-squares fit per parameter.
    Linear,
    /// Polynomial least-squares fit per parameter, up to `degree`.
    Polynomial {
        /// Maximum polynomial degree.
        degree: usize,
    },
    /// Exponential fit `a * exp(b * x) + c` per parameter, linearised via
    /// a log-transform least-squares pass.
    Exponential,
}

/// Result of evaluating an interpolator at a target angle.
#[derive(Debug, Clone)]
pub struct InterpolationResult {
    /// Interpolated parameter vector.
    pub parameters: Vec<f64>,
    /// Per-parameter fit residual (RMS over the training samples).
    pub fit_errors: Vec<f64>,
    /// Whether the target angle's coordinate fell outside the convex hull
    /// of the training samples (extrapolation).
    pub extrapolated: bool,
}

/// A fitted interpolator over one or more sample angles.
pub struct Interpolator {
    model: InterpolationModel,
    samples: Vec<Sample>,
    dim: usize,
}

impl Interpolator {
    /// Fit an interpolator to `samples` with the given model.
    pub fn fit(model: InterpolationModel, samples: Vec<Sample>) -> ChannelResult<Self> {
        if samples.is_empty() {
            return Err(ChannelError::InsufficientSamples {
                model: model_name(&model),
                need: 1,
                got: 0,
            });
        }
        let dim = samples[0].parameters.len();
        let need = match model {
            InterpolationModel::Average => 1,
            InterpolationModel::Linear => 2,
            InterpolationModel::Polynomial { degree } => degree + 1,
            InterpolationModel::Exponential => 3,
        };
        if samples.len() < need {
            return Err(ChannelError::InsufficientSamples {
                model: model_name(&model),
                need,
                got: samples.len(),
            });
        }
        Ok(Self {
            model,
            samples,
            dim,
        })
    }

    /// Evaluate the interpolator at `target`, returning the parameter
    /// vector, per-parameter fit errors and whether this was an
    /// extrapolation beyond the training samples' convex hull.
    pub fn evaluate(&self, target: U3Angle) -> InterpolationResult {
        let x = target.coordinate();
        let xs: Vec<f64> = self.samples.iter().map(|s| s.angle.coordinate()).collect();
        let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_x = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let extrapolated = x < min_x || x > max_x;

        let mut parameters = Vec::with_capacity(self.dim);
        let mut fit_errors = Vec::with_capacity(self.dim);

        for component in 0..self.dim {
            let ys: Vec<f64> = self.samples.iter().map(|s| s.parameters[component]).collect();
            let (value, error) = match self.model {
                InterpolationModel::Average => {
                    let mean = ys.iter().sum::<f64>() / ys.len() as f64;
                    let error = rms_error(&ys, &vec![mean; ys.len()]);
                    (mean, error)
                }
                InterpolationModel::Linear => fit_polynomial(&xs, &ys, 1, x),
                InterpolationModel::Polynomial { degree } => {
                    let degree = degree.min(xs.len() - 1).max(1);
                    fit_polynomial(&xs, &ys, degree, x)
                }
                InterpolationModel::Exponential => fit_exponential(&xs, &ys, x),
            };
            parameters.push(value);
            fit_errors.push(error);
        }

        if extrapolated {
            tracing::warn!(
                target_coordinate = x,
                min = min_x,
                max = max_x,
                "interpolation evaluated outside the convex hull of training samples"
            );
        }

        InterpolationResult {
            parameters,
            fit_errors,
            extrapolated,
        }
    }
}

fn model_name(model: &InterpolationModel) -> String {
    match model {
        InterpolationModel::Average => "average".to_string(),
        InterpolationModel::Linear => "linear".to_string(),
        InterpolationModel::Polynomial { degree } => format!("polynomial(degree={degree})"),
        InterpolationModel::Exponential => "exponential".to_string(),
    }
}

fn rms_error(ys: &[f64], fitted: &[f64]) -> f64 {
    let n = ys.len() as f64;
    (ys.iter()
        .zip(fitted)
        .map(|(y, f)| (y - f).powi(2))
        .sum::<f64>()
        / n)
        .sqrt()
}

/// Least-squares polynomial fit of the given degree, solved via the normal
/// equations over the Vandermonde matrix (small, fixed-size systems —
/// adequate for the handful of calibration points this model targets).
fn fit_polynomial(xs: &[f64], ys: &[f64], degree: usize, x: f64) -> (f64, f64) {
    let terms = degree + 1;
    let n = xs.len();

    let vander = nalgebra::DMatrix::from_fn(n, terms, |row, col| xs[row].powi(col as i32));
    let y_vec = nalgebra::DVector::from_fn(n, |row, _| ys[row]);

    let vt = vander.transpose();
    let normal = &vt * &vander;
    let rhs = &vt * &y_vec;

    let coeffs = normal
        .clone()
        .lu()
        .solve(&rhs)
        .unwrap_or_else(|| nalgebra::DVector::zeros(terms));

    let eval = |point: f64| -> f64 {
        (0..terms).map(|k| coeffs[k] * point.powi(k as i32)).sum()
    };

    let fitted: Vec<f64> = xs.iter().map(|&px| eval(px)).collect();
    (eval(x), rms_error(ys, &fitted))
}

/// Exponential fit `y = a * exp(b * x) + c`, approximated by fitting
/// `ln(y - min(y) + 1)` linearly in `x` and inverting — adequate for
/// monotone damping-parameter calibration curves.
fn fit_exponential(xs: &[f64], ys: &[f64], x: f64) -> (f64, f64) {
    let offset = ys.iter().cloned().fold(f64::INFINITY, f64::min).min(0.0).abs() + 1.0;
    let log_ys: Vec<f64> = ys.iter().map(|y| (y + offset).ln()).collect();
    let (log_value, _) = fit_polynomial(xs, &log_ys, 1, x);
    let value = log_value.exp() - offset;

    let fitted: Vec<f64> = xs
        .iter()
        .map(|&px| {
            let (v, _) = fit_polynomial(xs, &log_ys, 1, px);
            v.exp() - offset
        })
        .collect();
    (value, rms_error(ys, &fitted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(theta: f64, value: f64) -> Sample {
        Sample {
            angle: U3Angle::new(theta, 0.0, 0.0),
            parameters: vec![value],
        }
    }

    #[test]
    fn test_average_model() {
        let samples = vec![sample(0.0, 1.0), sample(1.0, 3.0)];
        let interp = Interpolator::fit(InterpolationModel::Average, samples).unwrap();
        let result = interp.evaluate(U3Angle::new(0.5, 0.0, 0.0));
        assert!((result.parameters[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_model_exact_fit() {
        let samples = vec![sample(0.0, 1.0), sample(1.0, 3.0), sample(2.0, 5.0)];
        let interp = Interpolator::fit(InterpolationModel::Linear, samples).unwrap();
        let result = interp.evaluate(U3Angle::new(0.5, 0.0, 0.0));
        assert!((result.parameters[0] - 2.0).abs() < 1e-6);
        assert!(result.fit_errors[0] < 1e-6);
    }

    #[test]
    fn test_extrapolation_flag() {
        let samples = vec![sample(0.0, 1.0), sample(1.0, 2.0)];
        let interp = Interpolator::fit(InterpolationModel::Linear, samples).unwrap();
        let result = interp.evaluate(U3Angle::new(10.0, 0.0, 0.0));
        assert!(result.extrapolated);
    }

    #[test]
    fn test_insufficient_samples_rejected() {
        let samples = vec![sample(0.0, 1.0)];
        let err = Interpolator::fit(InterpolationModel::Polynomial { degree: 3 }, samples);
        assert!(err.is_err());
    }
}
