//! Constant-velocity Kalman filter for bounding box tracking using ndarray and
//! a nalgebra-based 4x4 inverse.
//!
//! State layout: `[cx, cy, w, h, vx, vy, vw, vh]`. The measurement is the box
//! center, width and height.

use ndarray::{Array1, Array2};

use crate::error::MotionError;

const NDIM: usize = 4;

/// Determinant magnitude below which the innovation covariance is regularized.
const SINGULAR_DET: f64 = 1e-9;
const REGULARIZATION: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    process_noise: Array2<f64>,
    measurement_noise: Array2<f64>,
    initial_velocity_variance: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let mut motion_mat = Array2::eye(2 * NDIM);
        for i in 0..NDIM {
            motion_mat[[i, NDIM + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((NDIM, 2 * NDIM));
        for i in 0..NDIM {
            update_mat[[i, i]] = 1.0;
        }

        let mut process_noise = Array2::eye(2 * NDIM);
        for i in NDIM..2 * NDIM {
            process_noise[[i, i]] = 0.01;
        }

        Self {
            motion_mat,
            update_mat,
            process_noise,
            measurement_noise: Array2::eye(NDIM) * 10.0,
            initial_velocity_variance: 1000.0,
        }
    }

    /// Create a track state from an unassociated measurement `[cx, cy, w, h]`.
    /// Velocities start at zero with a large uncertainty.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(2 * NDIM);
        for i in 0..NDIM {
            mean[i] = measurement[i];
        }

        let mut cov = Array2::eye(2 * NDIM);
        for i in NDIM..2 * NDIM {
            cov[[i, i]] = self.initial_velocity_variance;
        }

        (mean, cov)
    }

    /// Advance the state by one frame.
    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let new_mean = self.motion_mat.dot(mean);
        let new_covariance =
            self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + &self.process_noise;

        (new_mean, new_covariance)
    }

    /// Project the state into measurement space.
    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + &self.measurement_noise;

        (mean_proj, covariance_proj)
    }

    /// Correct the state with a measurement `[cx, cy, w, h]`.
    ///
    /// Fails instead of returning a state containing NaN or infinity.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Result<(Array1<f64>, Array2<f64>), MotionError> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let measurement_arr = Array1::from_vec(measurement.to_vec());
        let innovation = measurement_arr - projected_mean;

        // K = P * H^T * S^-1
        let s_inv = invert_4x4(&projected_cov)?;
        let pht = covariance.dot(&self.update_mat.t()); // 8x4
        let kalman_gain = pht.dot(&s_inv); // 8x4

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let identity = Array2::<f64>::eye(2 * NDIM);
        let new_covariance = (identity - kalman_gain.dot(&self.update_mat)).dot(covariance);

        if new_mean.iter().chain(new_covariance.iter()).any(|v| !v.is_finite()) {
            return Err(MotionError::NonFinite { stage: "update" });
        }

        Ok((new_mean, new_covariance))
    }
}

/// Invert a 4x4 matrix with nalgebra, adding a small diagonal term first when
/// it is close to singular.
fn invert_4x4(m: &Array2<f64>) -> Result<Array2<f64>, MotionError> {
    let mut nm = nalgebra::Matrix4::zeros();
    for i in 0..NDIM {
        for j in 0..NDIM {
            nm[(i, j)] = m[[i, j]];
        }
    }
    if !nm.iter().all(|v| v.is_finite()) {
        return Err(MotionError::NonFinite { stage: "projection" });
    }
    if nm.determinant().abs() < SINGULAR_DET {
        nm += nalgebra::Matrix4::identity() * REGULARIZATION;
    }

    let inv = nm.try_inverse().ok_or(MotionError::SingularInnovation)?;
    let mut res = Array2::zeros((NDIM, NDIM));
    for i in 0..NDIM {
        for j in 0..NDIM {
            res[[i, j]] = inv[(i, j)];
        }
    }
    Ok(res)
}
