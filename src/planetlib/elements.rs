//! Keplerian orbital elements and Kepler's equation

use crate::constants::TAU;
use crate::coordinates::cartesian::Cartesian3;
use crate::{Result, SkyframeError};
use log::trace;

/// Convergence threshold on successive eccentric-anomaly estimates, in radians
pub const KEPLER_TOLERANCE: f64 = 1e-6;
/// Newton iterations allowed before giving up
pub const KEPLER_MAX_ITERATIONS: usize = 100;

/// The six classical elements of a heliocentric orbit
///
/// Distance is in AU, all angles in radians. The true anomaly is not stored:
/// it depends on solving Kepler's equation and is computed on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Mean distance (semi-major axis)
    pub distance: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    /// Longitude of the ascending node
    pub ascending_node: f64,
    /// Longitude of perihelion
    pub perihelion: f64,
    pub mean_longitude: f64,
}

impl OrbitalElements {
    /// Mean anomaly in [0, 2π)
    pub fn mean_anomaly(&self) -> f64 {
        (self.mean_longitude - self.perihelion).rem_euclid(TAU)
    }

    /// True anomaly in [0, 2π)
    pub fn true_anomaly(&self) -> Result<f64> {
        true_anomaly(self.mean_anomaly(), self.eccentricity)
    }

    /// Heliocentric ecliptic position in AU
    pub fn heliocentric(&self) -> Result<Cartesian3> {
        heliocentric_from_elements(self)
    }
}

/// Solves Kepler's equation `M = E - e sin E` for the eccentric anomaly `E`.
///
/// Newton's method seeded with `E₀ = M + e sin M (1 + e cos M)`. Stops once two
/// successive estimates differ by at most [`KEPLER_TOLERANCE`]; running out of
/// iterations is reported as [`SkyframeError::NonConvergence`].
pub fn eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
    solve_kepler(mean_anomaly, eccentricity, KEPLER_MAX_ITERATIONS)
}

/// [`eccentric_anomaly`] with an explicit iteration budget
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64, max_iterations: usize) -> Result<f64> {
    if !mean_anomaly.is_finite() {
        return Err(SkyframeError::InvalidInput(format!(
            "mean anomaly {} is not finite",
            mean_anomaly
        )));
    }
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(SkyframeError::InvalidInput(format!(
            "eccentricity {} is outside [0, 1)",
            eccentricity
        )));
    }

    let m = mean_anomaly;
    let e = eccentricity;
    let mut estimate = m + e * m.sin() * (1.0 + e * m.cos());
    let mut step = f64::INFINITY;

    for iteration in 1..=max_iterations {
        let next = estimate - (estimate - e * estimate.sin() - m) / (1.0 - e * estimate.cos());
        step = (next - estimate).abs();
        estimate = next;
        if step <= KEPLER_TOLERANCE {
            trace!("Kepler solver converged in {} iterations", iteration);
            return Ok(estimate);
        }
    }

    Err(SkyframeError::NonConvergence {
        solver: "Kepler solver",
        iterations: max_iterations,
        residual: step,
    })
}

/// True anomaly in [0, 2π) for the given mean anomaly and eccentricity
pub fn true_anomaly(mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
    let e = eccentricity;
    let big_e = eccentric_anomaly(mean_anomaly, e)?;
    let v = 2.0 * (((1.0 + e) / (1.0 - e)).sqrt() * (big_e / 2.0).tan()).atan();
    Ok(v.rem_euclid(TAU))
}

/// Heliocentric position in the ecliptic frame, in AU
pub fn heliocentric_from_elements(elements: &OrbitalElements) -> Result<Cartesian3> {
    let a = elements.distance;
    let e = elements.eccentricity;
    let i = elements.inclination;
    let node = elements.ascending_node;

    let v = elements.true_anomaly()?;
    let radius = a * (1.0 - e * e) / (1.0 + e * v.cos());

    // Argument of latitude: angle from the ascending node along the orbit
    let u = v + elements.perihelion - node;
    let (sin_u, cos_u) = u.sin_cos();
    let (sin_node, cos_node) = node.sin_cos();
    let cos_i = i.cos();

    Ok(Cartesian3::new(
        radius * (cos_node * cos_u - sin_node * sin_u * cos_i),
        radius * (sin_node * cos_u + cos_node * sin_u * cos_i),
        radius * sin_u * i.sin(),
    ))
}
