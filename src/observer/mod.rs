//! The astronomer: where and when the observer is, and where the device points
//!
//! Three frames are involved:
//!
//! 1. Celestial: fixed against the stars, x toward (RA 0°, Dec 0°), z toward
//!    the north celestial pole.
//! 2. Phone: fixed in the device, x across the short side, y along the long
//!    side, z out of the screen.
//! 3. Local: x North along the ground, y Up, z East.
//!
//! [`AstronomerModel`] keeps the local axes expressed in celestial coordinates
//! (recomputed lazily from the clock and location) and in phone coordinates
//! (from the latest sensor readings), and composes the two to turn the
//! device's pointing direction into sky coordinates.

pub mod magnetic;
pub mod pointing;
pub mod sensors;

pub use magnetic::{
    DipoleMagneticDeclination, MagneticDeclination, MagneticModel, ZeroMagneticDeclination,
};
pub use pointing::{Pointing, ViewDirectionMode};
pub use sensors::PhoneAxes;

use crate::constants::MINUTE_MS;
use crate::coordinates::{Cartesian3, LatLong, RaDec};
use crate::framelib::rotation::{matrix_from_vectors, rotation_matrix, transform, MatrixLayout};
use crate::time::{datetime_from_millis, mean_sidereal_time, Clock, SystemClock};
use crate::{Result, SkyframeError};
use chrono::{DateTime, Utc};
use log::{debug, trace, warn};
use nalgebra::Matrix3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Phone acceleration before the first reading arrives
pub const INITIAL_ACCELERATION: Cartesian3 = Cartesian3::new(0.0, -1.0, -9.0);
/// Phone magnetic field before the first reading arrives
pub const INITIAL_MAGNETIC_FIELD: Cartesian3 = Cartesian3::new(0.0, -1.0, 0.0);

const AXIS_OF_EARTHS_ROTATION: Cartesian3 = Cartesian3::unit_z();

/// Tunables for an [`AstronomerModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Field of view in degrees
    pub field_of_view: f64,
    pub view_direction_mode: ViewDirectionMode,
    /// Minimum time between recomputations of the celestial axes
    pub recompute_interval_ms: i64,
    pub auto_update_pointing: bool,
    pub magnetic_model: MagneticModel,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            field_of_view: 45.0,
            view_direction_mode: ViewDirectionMode::Standard,
            recompute_interval_ms: MINUTE_MS,
            auto_update_pointing: true,
            magnetic_model: MagneticModel::Zero,
        }
    }
}

impl ModelConfig {
    /// Parses a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ModelConfig =
            serde_json::from_str(json).map_err(|e| SkyframeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SkyframeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.field_of_view > 0.0 && self.field_of_view < 180.0) {
            return Err(SkyframeError::Config(format!(
                "field of view {} must be in (0, 180) degrees",
                self.field_of_view
            )));
        }
        if self.recompute_interval_ms < 0 {
            return Err(SkyframeError::Config(format!(
                "recompute interval {} ms is negative",
                self.recompute_interval_ms
            )));
        }
        Ok(())
    }
}

/// Local axes in celestial coordinates
#[derive(Debug, Clone, Copy)]
struct CelestialAxes {
    true_north: Cartesian3,
    true_east: Cartesian3,
    up: Cartesian3,
    /// Columns: magnetic North, Up, magnetic East
    magnetic: Matrix3<f64>,
}

impl Default for CelestialAxes {
    fn default() -> Self {
        CelestialAxes {
            true_north: Cartesian3::unit_x(),
            true_east: AXIS_OF_EARTHS_ROTATION,
            up: Cartesian3::unit_y(),
            magnetic: Matrix3::identity(),
        }
    }
}

/// Local axes in celestial coordinates at `time` and `location`, with the
/// magnetic frame rotated from true North by `declination` degrees east.
fn celestial_axes(
    time: &DateTime<Utc>,
    location: &LatLong,
    declination: f64,
) -> Option<CelestialAxes> {
    let zenith = RaDec::new(mean_sidereal_time(time, location.longitude()), location.latitude());
    let up = zenith.to_geocentric();
    // At the poles the rotation axis has no horizontal component
    let true_north = AXIS_OF_EARTHS_ROTATION.reject_from(&up).normalize()?;
    let true_east = true_north.cross(&up);

    let magnetic_north = transform(&rotation_matrix(-declination, &up), &true_north);
    let magnetic_east = magnetic_north.cross(&up);
    let magnetic = matrix_from_vectors(&magnetic_north, &up, &magnetic_east, MatrixLayout::Columns);

    Some(CelestialAxes {
        true_north,
        true_east,
        up,
        magnetic,
    })
}

/// Fuses location, time and orientation sensors into a sky pointing
///
/// Readers recompute lazily, so they take `&mut self`. Every accessor returns
/// a copy. For shared access from a sensor thread and a render thread, wrap
/// the model in a [`SharedAstronomerModel`].
pub struct AstronomerModel {
    clock: Box<dyn Clock>,
    magnetic_declination: Box<dyn MagneticDeclination>,
    config: ModelConfig,
    location: LatLong,

    acceleration: Cartesian3,
    magnetic_field: Cartesian3,
    rotation_vector: Option<[f64; 4]>,
    phone_axes: PhoneAxes,

    celestial: CelestialAxes,
    last_updated: Option<i64>,
    pointing: Pointing,
}

impl std::fmt::Debug for AstronomerModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstronomerModel")
            .field("config", &self.config)
            .field("location", &self.location)
            .field("last_updated", &self.last_updated)
            .field("pointing", &self.pointing)
            .finish_non_exhaustive()
    }
}

impl Default for AstronomerModel {
    fn default() -> Self {
        AstronomerModel::new(ModelConfig::default())
    }
}

impl AstronomerModel {
    /// A model running on the system clock
    pub fn new(config: ModelConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock<C: Clock + 'static>(config: ModelConfig, clock: C) -> Self {
        let magnetic_declination = config.magnetic_model.provider();
        let mut model = AstronomerModel {
            clock: Box::new(clock),
            magnetic_declination,
            config,
            location: LatLong::default(),
            acceleration: INITIAL_ACCELERATION,
            magnetic_field: INITIAL_MAGNETIC_FIELD,
            rotation_vector: None,
            phone_axes: PhoneAxes {
                north: Cartesian3::unit_y(),
                east: Cartesian3::unit_x(),
                up: Cartesian3::unit_z(),
            },
            celestial: CelestialAxes::default(),
            last_updated: None,
            pointing: Pointing::default(),
        };
        model.update_phone_axes();
        model.update_celestial_axes(true);
        model
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn field_of_view(&self) -> f64 {
        self.config.field_of_view
    }

    /// Ignores (and logs) a value outside (0, 180) degrees
    pub fn set_field_of_view(&mut self, degrees: f64) -> bool {
        if !(degrees > 0.0 && degrees < 180.0) {
            warn!("Field of view {} outside (0, 180) degrees, ignoring", degrees);
            return false;
        }
        self.config.field_of_view = degrees;
        true
    }

    pub fn view_direction_mode(&self) -> ViewDirectionMode {
        self.config.view_direction_mode
    }

    pub fn set_view_direction_mode(&mut self, mode: ViewDirectionMode) {
        self.config.view_direction_mode = mode;
    }

    pub fn auto_update_pointing(&self) -> bool {
        self.config.auto_update_pointing
    }

    /// When off, [`AstronomerModel::pointing`] returns whatever was last set
    /// with [`AstronomerModel::set_pointing`].
    pub fn set_auto_update_pointing(&mut self, auto_update: bool) {
        self.config.auto_update_pointing = auto_update;
    }

    pub fn location(&self) -> LatLong {
        self.location
    }

    pub fn set_location(&mut self, location: LatLong) {
        self.location = location;
        self.update_celestial_axes(true);
    }

    pub fn set_clock<C: Clock + 'static>(&mut self, clock: C) {
        self.clock = Box::new(clock);
        self.update_celestial_axes(true);
    }

    pub fn set_magnetic_declination<M: MagneticDeclination + 'static>(&mut self, provider: M) {
        self.magnetic_declination = Box::new(provider);
        self.update_celestial_axes(true);
    }

    /// Current magnetic declination at the model's location, in degrees east
    pub fn magnetic_correction(&self) -> f64 {
        self.magnetic_declination
            .declination(&self.location, self.time_millis())
    }

    pub fn time_millis(&self) -> i64 {
        self.clock.time_in_millis_since_epoch()
    }

    pub fn time(&self) -> Result<DateTime<Utc>> {
        datetime_from_millis(self.time_millis())
    }

    /// Feeds raw accelerometer and magnetometer readings in phone coordinates
    ///
    /// Readings too short to carry a direction are ignored and the previous
    /// ones kept. Returns whether the readings were accepted.
    pub fn set_phone_sensor_values(
        &mut self,
        acceleration: Cartesian3,
        magnetic_field: Cartesian3,
    ) -> bool {
        if !sensors::is_usable_reading(&acceleration)
            || !sensors::is_usable_reading(&magnetic_field)
        {
            warn!(
                "Invalid sensor values, ignoring (accel {}, mag {})",
                acceleration, magnetic_field
            );
            return false;
        }
        self.acceleration = acceleration;
        self.magnetic_field = magnetic_field;
        self.rotation_vector = None;
        true
    }

    /// Feeds a fused rotation vector, which then takes precedence over the
    /// raw readings until new ones arrive.
    pub fn set_rotation_vector(&mut self, values: &[f32]) -> bool {
        match sensors::rotation_quaternion(values) {
            Some(q) => {
                self.rotation_vector = Some(q);
                true
            }
            None => {
                warn!("Invalid rotation vector {:?}, ignoring", values);
                false
            }
        }
    }

    pub fn north(&mut self) -> Cartesian3 {
        self.update_celestial_axes(false);
        self.celestial.true_north
    }

    pub fn south(&mut self) -> Cartesian3 {
        -self.north()
    }

    pub fn east(&mut self) -> Cartesian3 {
        self.update_celestial_axes(false);
        self.celestial.true_east
    }

    pub fn west(&mut self) -> Cartesian3 {
        -self.east()
    }

    pub fn zenith(&mut self) -> Cartesian3 {
        self.update_celestial_axes(false);
        self.celestial.up
    }

    pub fn nadir(&mut self) -> Cartesian3 {
        -self.zenith()
    }

    /// Up, expressed in phone coordinates
    pub fn phone_up_direction(&mut self) -> Cartesian3 {
        self.update_phone_axes();
        self.phone_axes.up
    }

    /// Where the device is pointing in sky coordinates
    pub fn pointing(&mut self) -> Pointing {
        if self.config.auto_update_pointing {
            self.update_pointing();
        }
        self.pointing
    }

    /// Sets the pointing directly, for use with auto-update turned off
    pub fn set_pointing(&mut self, line_of_sight: Cartesian3, perpendicular: Cartesian3) {
        match Pointing::new(line_of_sight, perpendicular) {
            Some(pointing) => self.pointing = pointing,
            None => warn!(
                "Degenerate pointing ({}, {}), ignoring",
                line_of_sight, perpendicular
            ),
        }
    }

    fn update_pointing(&mut self) {
        self.update_celestial_axes(false);
        self.update_phone_axes();

        let mode = self.config.view_direction_mode;
        let transform_matrix = self.celestial.magnetic * self.phone_axes.inverse_matrix();
        let line_of_sight = transform(&transform_matrix, &mode.pointing_in_phone());
        let perpendicular = transform(&transform_matrix, &mode.screen_up_in_phone());
        self.pointing = Pointing {
            line_of_sight,
            perpendicular,
        };
        trace!("Pointing {} up {}", line_of_sight, perpendicular);
    }

    fn update_phone_axes(&mut self) {
        let axes = match &self.rotation_vector {
            Some(q) => Some(PhoneAxes::from_rotation_vector(q)),
            None => PhoneAxes::from_sensors(&self.acceleration, &self.magnetic_field),
        };
        match axes {
            Some(axes) => self.phone_axes = axes,
            None => warn!("Magnetic field is parallel to gravity, keeping previous phone axes"),
        }
    }

    fn update_celestial_axes(&mut self, force: bool) {
        let now = self.time_millis();
        if !force {
            if let Some(last) = self.last_updated {
                let interval = u64::try_from(self.config.recompute_interval_ms).unwrap_or(0);
                if now.abs_diff(last) < interval {
                    return;
                }
            }
        }

        let time = match datetime_from_millis(now) {
            Ok(time) => time,
            Err(e) => {
                warn!("Cannot recompute celestial axes: {}", e);
                return;
            }
        };
        let declination = self.magnetic_declination.declination(&self.location, now);
        match celestial_axes(&time, &self.location, declination) {
            Some(axes) => {
                self.celestial = axes;
                self.last_updated = Some(now);
                debug!(
                    "Recomputed celestial axes at {} for {} (declination {:.2}°)",
                    time, self.location, declination
                );
            }
            None => warn!("No local North at {}, keeping previous axes", self.location),
        }
    }
}

/// An [`AstronomerModel`] shared between a sensor writer and render readers
///
/// Each call takes the lock once, so a reader's "recompute, then read" is
/// atomic with respect to writers, and what it gets back is a copy.
#[derive(Debug, Clone)]
pub struct SharedAstronomerModel {
    inner: Arc<Mutex<AstronomerModel>>,
}

impl SharedAstronomerModel {
    pub fn new(model: AstronomerModel) -> Self {
        SharedAstronomerModel {
            inner: Arc::new(Mutex::new(model)),
        }
    }

    /// Runs `f` with the lock held
    pub fn with_model<R>(&self, f: impl FnOnce(&mut AstronomerModel) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn set_location(&self, location: LatLong) {
        self.inner.lock().set_location(location);
    }

    pub fn set_phone_sensor_values(
        &self,
        acceleration: Cartesian3,
        magnetic_field: Cartesian3,
    ) -> bool {
        self.inner
            .lock()
            .set_phone_sensor_values(acceleration, magnetic_field)
    }

    pub fn set_rotation_vector(&self, values: &[f32]) -> bool {
        self.inner.lock().set_rotation_vector(values)
    }

    pub fn set_clock<C: Clock + 'static>(&self, clock: C) {
        self.inner.lock().set_clock(clock);
    }

    pub fn set_magnetic_declination<M: MagneticDeclination + 'static>(&self, provider: M) {
        self.inner.lock().set_magnetic_declination(provider);
    }

    pub fn set_view_direction_mode(&self, mode: ViewDirectionMode) {
        self.inner.lock().set_view_direction_mode(mode);
    }

    pub fn pointing(&self) -> Pointing {
        self.inner.lock().pointing()
    }

    pub fn zenith(&self) -> Cartesian3 {
        self.inner.lock().zenith()
    }

    pub fn north(&self) -> Cartesian3 {
        self.inner.lock().north()
    }

    pub fn east(&self) -> Cartesian3 {
        self.inner.lock().east()
    }

    pub fn location(&self) -> LatLong {
        self.inner.lock().location()
    }

    pub fn time_millis(&self) -> i64 {
        self.inner.lock().time_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use chrono::TimeZone;
    use std::thread;

    // Mean sidereal time at Greenwich is ~0 here, so (RA 0, Dec 0) is overhead
    // at (0, 0).
    fn equinox_millis() -> i64 {
        Utc.with_ymd_and_hms(2009, 3, 20, 12, 7, 24)
            .unwrap()
            .timestamp_millis()
    }

    fn assert_vec_near(actual: Cartesian3, expected: Cartesian3) {
        assert!(
            (actual - expected).length() < 1e-3,
            "{} != {}",
            actual,
            expected
        );
    }

    fn equinox_model() -> AstronomerModel {
        AstronomerModel::with_clock(ModelConfig::default(), FixedClock::new(equinox_millis()))
    }

    #[test]
    fn test_axes_at_equator() {
        let mut model = equinox_model();
        assert_vec_near(model.zenith(), Cartesian3::unit_x());
        assert_vec_near(model.nadir(), -Cartesian3::unit_x());
        assert_vec_near(model.north(), Cartesian3::unit_z());
        assert_vec_near(model.south(), -Cartesian3::unit_z());
        assert_vec_near(model.east(), Cartesian3::unit_y());
        assert_vec_near(model.west(), -Cartesian3::unit_y());
    }

    #[test]
    fn test_flat_phone_looks_down() {
        let mut model = equinox_model();
        assert!(model.set_phone_sensor_values(
            Cartesian3::new(0.0, 0.0, 10.0),
            Cartesian3::new(0.0, 5.0, -10.0),
        ));
        let pointing = model.pointing();
        assert_vec_near(pointing.line_of_sight, -Cartesian3::unit_x());
        assert_vec_near(pointing.perpendicular, Cartesian3::unit_z());
        assert_vec_near(model.phone_up_direction(), Cartesian3::unit_z());
    }

    #[test]
    fn test_rejected_sensor_values_keep_state() {
        let mut model = equinox_model();
        model.set_phone_sensor_values(
            Cartesian3::new(0.0, 0.0, 10.0),
            Cartesian3::new(0.0, 5.0, -10.0),
        );
        let before = model.pointing();

        assert!(!model.set_phone_sensor_values(
            Cartesian3::new(0.01, 0.0, 0.0),
            Cartesian3::new(0.0, 5.0, 0.0),
        ));
        assert!(!model.set_phone_sensor_values(Cartesian3::new(0.0, 9.0, 0.0), Cartesian3::zero()));
        assert_eq!(model.pointing(), before);
    }

    #[test]
    fn test_identity_rotation_vector_matches_flat_phone() {
        let mut model = equinox_model();
        assert!(model.set_rotation_vector(&[0.0, 0.0, 0.0, 1.0]));
        let pointing = model.pointing();
        assert_vec_near(pointing.line_of_sight, -Cartesian3::unit_x());
        assert_vec_near(pointing.perpendicular, Cartesian3::unit_z());

        assert!(!model.set_rotation_vector(&[2.0, 0.0, 0.0]));
        // Raw readings take over again
        model.set_phone_sensor_values(
            Cartesian3::new(0.0, 10.0, 0.0),
            Cartesian3::new(0.0, 10.0, -1.0),
        );
        assert_vec_near(model.pointing().line_of_sight, Cartesian3::unit_z());
    }

    #[test]
    fn test_view_direction_modes() {
        let mut model = equinox_model();
        model.set_phone_sensor_values(
            Cartesian3::new(0.0, 0.0, 10.0),
            Cartesian3::new(0.0, 5.0, -10.0),
        );

        model.set_view_direction_mode(ViewDirectionMode::Rotate90);
        let p = model.pointing();
        assert_vec_near(p.line_of_sight, -Cartesian3::unit_x());
        // Phone x is East when the top of the phone faces North
        assert_vec_near(p.perpendicular, Cartesian3::unit_y());

        model.set_view_direction_mode(ViewDirectionMode::Telescope);
        let p = model.pointing();
        assert_vec_near(p.line_of_sight, Cartesian3::unit_z());
        assert_vec_near(p.perpendicular, Cartesian3::unit_x());
    }

    #[test]
    fn test_manual_pointing() {
        let mut model = equinox_model();
        model.set_auto_update_pointing(false);
        model.set_pointing(Cartesian3::new(0.0, 3.0, 0.0), Cartesian3::new(0.0, 1.0, 1.0));
        let p = model.pointing();
        assert_vec_near(p.line_of_sight, Cartesian3::unit_y());
        assert_vec_near(p.perpendicular, Cartesian3::unit_z());
    }

    #[test]
    fn test_recompute_is_throttled() {
        let clock = Arc::new(FixedClock::new(equinox_millis()));
        let mut model = AstronomerModel::with_clock(ModelConfig::default(), clock.clone());
        let zenith = model.zenith();

        // Sidereal rotation inside the interval is not picked up
        clock.advance(MINUTE_MS - 1);
        assert_eq!(model.zenith(), zenith);

        clock.advance(60 * MINUTE_MS);
        let moved = model.zenith();
        assert!(moved.distance_from(&zenith) > 10.0);

        // A location change forces a recompute straight away
        model.set_location(LatLong::new(45.0, 0.0));
        assert!(model.zenith().distance_from(&moved) > 40.0);
    }

    #[test]
    fn test_extreme_clock_jump_keeps_axes() {
        let clock = Arc::new(FixedClock::new(equinox_millis()));
        let mut model = AstronomerModel::with_clock(ModelConfig::default(), clock.clone());
        let north = model.north();

        // Out of chrono's range, so the previous axes stay in place
        clock.set(i64::MIN);
        assert_eq!(model.north(), north);
        clock.set(i64::MAX);
        assert_eq!(model.north(), north);
    }

    #[test]
    fn test_field_of_view_setter_validates() {
        let mut model = equinox_model();
        assert!(model.set_field_of_view(60.0));
        for bad in [0.0, -10.0, 180.0, 200.0, f64::NAN] {
            assert!(!model.set_field_of_view(bad));
        }
        assert_eq!(model.field_of_view(), 60.0);
    }

    #[test]
    fn test_magnetic_declination_rotates_pointing_only() {
        let mut model = equinox_model();
        model.set_magnetic_declination(|_: &LatLong, _: i64| 10.0);
        assert_eq!(model.magnetic_correction(), 10.0);
        // True axes ignore the declination
        assert_vec_near(model.north(), Cartesian3::unit_z());

        let (s, c) = 10f64.to_radians().sin_cos();
        model.set_phone_sensor_values(
            Cartesian3::new(0.0, 10.0, 0.0),
            Cartesian3::new(s, 10.0, -c),
        );
        let p = model.pointing();
        assert_vec_near(p.line_of_sight, Cartesian3::unit_z());
        assert_vec_near(p.perpendicular, Cartesian3::unit_x());
    }

    #[test]
    fn test_config_json() {
        let json = r#"{"field_of_view": 30.0, "magnetic_model": "Dipole"}"#;
        let config = ModelConfig::from_json(json).unwrap();
        assert_eq!(config.field_of_view, 30.0);
        assert_eq!(config.magnetic_model, MagneticModel::Dipole);
        assert_eq!(config.recompute_interval_ms, 60_000);
        assert!(config.auto_update_pointing);

        assert!(matches!(ModelConfig::from_json("{"), Err(SkyframeError::Config(_))));
        assert!(matches!(
            ModelConfig::from_json(r#"{"field_of_view": 0.0}"#),
            Err(SkyframeError::Config(_))
        ));
        assert!(matches!(
            ModelConfig::load(Path::new("/nonexistent/skyframe.json")),
            Err(SkyframeError::Config(_))
        ));
    }

    #[test]
    fn test_shared_model_across_threads() {
        let shared = SharedAstronomerModel::new(equinox_model());
        let writer = shared.clone();
        let handle = thread::spawn(move || {
            for i in 0..100 {
                let tilt = i as f64 * 0.01;
                writer.set_phone_sensor_values(
                    Cartesian3::new(0.0, tilt, 10.0),
                    Cartesian3::new(0.0, 5.0, -10.0),
                );
            }
        });
        for _ in 0..100 {
            let p = shared.pointing();
            assert!((p.line_of_sight.length() - 1.0).abs() < 1e-9);
            assert!(p.line_of_sight.dot(&p.perpendicular).abs() < 1e-9);
        }
        handle.join().unwrap();
        assert_vec_near(shared.zenith(), Cartesian3::unit_x());
    }
}
