//! Solar system bodies and their orbital data
//!
//! Each [`Body`] maps to one static [`BodyRecord`] holding everything the rest
//! of the crate needs to know about it: display hints, the horizon correction
//! used by the rise/set solver, and (for the Earth and the planets) the linear
//! element table that drives the orbital model.
//!
//! The element tables are the JPL "approximate positions of the planets"
//! elements, valid roughly 1800-2050. Rates are per Julian century since
//! J2000.0 and angles are in degrees.

pub mod elements;
pub mod moon;
pub mod phase;

pub use elements::{
    eccentric_anomaly, heliocentric_from_elements, true_anomaly, OrbitalElements,
    KEPLER_MAX_ITERATIONS, KEPLER_TOLERANCE,
};

use crate::constants::{DEG2RAD, DISK_HORIZON_CORRECTION_DEG, HOUR_MS, MINUTE_MS, TAU};
use crate::time::julian_centuries;
use crate::{Result, SkyframeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Enum representing the solar system bodies, in back-to-front drawing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Pluto,
    Neptune,
    Uranus,
    Saturn,
    Jupiter,
    Mars,
    Sun,
    Mercury,
    Venus,
    Moon,
    Earth,
}

/// `base + rate × T`, with T in Julian centuries since J2000.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTerm {
    pub base: f64,
    pub rate: f64,
}

impl LinearTerm {
    const fn new(base: f64, rate: f64) -> Self {
        LinearTerm { base, rate }
    }

    const fn constant(base: f64) -> Self {
        LinearTerm { base, rate: 0.0 }
    }

    pub fn at(&self, centuries: f64) -> f64 {
        self.base + self.rate * centuries
    }
}

/// Linear element table for one body (distance in AU, angles in degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementTable {
    pub semi_major_axis: LinearTerm,
    pub eccentricity: LinearTerm,
    pub inclination: LinearTerm,
    pub mean_longitude: LinearTerm,
    pub perihelion: LinearTerm,
    pub ascending_node: LinearTerm,
}

impl ElementTable {
    /// Evaluates the table `centuries` Julian centuries after J2000.0
    pub fn at(&self, centuries: f64) -> OrbitalElements {
        OrbitalElements {
            distance: self.semi_major_axis.at(centuries),
            eccentricity: self.eccentricity.at(centuries),
            inclination: self.inclination.at(centuries) * DEG2RAD,
            ascending_node: self.ascending_node.at(centuries) * DEG2RAD,
            perihelion: self.perihelion.at(centuries) * DEG2RAD,
            mean_longitude: (self.mean_longitude.at(centuries) * DEG2RAD).rem_euclid(TAU),
        }
    }
}

/// Static description of one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyRecord {
    pub name: &'static str,
    /// Image resource name; the Moon's image depends on its phase instead
    pub image: &'static str,
    /// How often a display of this body needs refreshing
    pub update_frequency_ms: i64,
    /// Altitude of the body's centre at rise/set, in degrees
    pub horizon_correction: f64,
    /// Relative size of the body's sprite
    pub image_size: f64,
    pub elements: Option<ElementTable>,
}

const fn table(
    a: (f64, f64),
    e: (f64, f64),
    i: (f64, f64),
    l: (f64, f64),
    w: (f64, f64),
    node: LinearTerm,
) -> Option<ElementTable> {
    Some(ElementTable {
        semi_major_axis: LinearTerm::new(a.0, a.1),
        eccentricity: LinearTerm::new(e.0, e.1),
        inclination: LinearTerm::new(i.0, i.1),
        mean_longitude: LinearTerm::new(l.0, l.1),
        perihelion: LinearTerm::new(w.0, w.1),
        ascending_node: node,
    })
}

const fn planet(
    name: &'static str,
    image: &'static str,
    image_size: f64,
    elements: Option<ElementTable>,
) -> BodyRecord {
    BodyRecord {
        name,
        image,
        update_frequency_ms: HOUR_MS,
        horizon_correction: 0.0,
        image_size,
        elements,
    }
}

// Indexed by `Body as usize`
static RECORDS: [BodyRecord; 11] = [
    planet(
        "Pluto",
        "pluto",
        0.01,
        table(
            (39.482_116_75, -0.000_315_96),
            (0.248_827_30, 0.000_051_70),
            (17.140_012_06, 0.000_048_18),
            (238.929_038_33, 145.207_805_15),
            (224.068_916_29, -0.040_629_42),
            LinearTerm::new(110.303_936_84, -0.011_834_82),
        ),
    ),
    planet(
        "Neptune",
        "neptune",
        0.015,
        table(
            (30.069_922_76, 0.000_262_91),
            (0.008_590_48, 0.000_051_05),
            (1.770_043_47, 0.000_353_72),
            (-55.120_029_69, 218.459_453_25),
            (44.964_762_27, -0.322_414_64),
            LinearTerm::new(131.784_225_74, -0.005_086_64),
        ),
    ),
    planet(
        "Uranus",
        "uranus",
        0.015,
        table(
            (19.189_164_64, -0.001_961_76),
            (0.047_257_44, -0.000_043_97),
            (0.772_637_83, -0.002_429_39),
            (313.238_104_51, 428.482_027_85),
            (170.954_276_30, 0.408_052_81),
            LinearTerm::new(74.016_925_03, 0.042_405_89),
        ),
    ),
    planet(
        "Saturn",
        "saturn",
        0.035,
        table(
            (9.536_675_94, -0.001_250_60),
            (0.053_861_79, -0.000_509_91),
            (2.485_991_87, 0.001_936_09),
            (49.954_244_23, 1_222.493_622_01),
            (92.598_878_31, -0.418_972_16),
            LinearTerm::new(113.662_424_48, -0.288_677_94),
        ),
    ),
    planet(
        "Jupiter",
        "jupiter",
        0.025,
        table(
            (5.202_887_00, -0.000_116_07),
            (0.048_386_24, -0.000_132_53),
            (1.304_396_95, -0.001_837_14),
            (34.396_440_51, 3_034.746_127_75),
            (14.728_479_83, 0.212_526_68),
            LinearTerm::new(100.473_909_09, 0.204_691_06),
        ),
    ),
    planet(
        "Mars",
        "mars",
        0.01,
        table(
            (1.523_710_34, 0.000_018_47),
            (0.093_394_10, 0.000_078_82),
            (1.849_691_42, -0.008_131_31),
            (-4.553_432_05, 19_140.302_684_99),
            (-23.943_629_59, 0.444_410_88),
            LinearTerm::new(49.559_538_91, -0.292_573_43),
        ),
    ),
    BodyRecord {
        name: "Sun",
        image: "sun",
        update_frequency_ms: HOUR_MS,
        horizon_correction: DISK_HORIZON_CORRECTION_DEG,
        image_size: 0.02,
        elements: None,
    },
    planet(
        "Mercury",
        "mercury",
        0.01,
        table(
            (0.387_099_27, 0.000_000_37),
            (0.205_635_93, 0.000_019_06),
            (7.004_979_02, -0.005_947_49),
            (252.250_323_50, 149_472.674_111_75),
            (77.457_796_28, 0.160_476_89),
            LinearTerm::new(48.330_765_93, -0.125_340_81),
        ),
    ),
    planet(
        "Venus",
        "venus",
        0.01,
        table(
            (0.723_335_66, 0.000_003_90),
            (0.006_776_72, -0.000_041_07),
            (3.394_676_05, -0.000_788_90),
            (181.979_099_50, 58_517.815_387_29),
            (131.602_467_18, 0.002_683_29),
            LinearTerm::new(76.679_842_55, -0.277_694_18),
        ),
    ),
    BodyRecord {
        name: "Moon",
        image: "moon4",
        update_frequency_ms: MINUTE_MS,
        horizon_correction: DISK_HORIZON_CORRECTION_DEG,
        image_size: 0.02,
        elements: None,
    },
    // Earth-Moon barycentre; the ascending node is undefined on the ecliptic
    planet(
        "Earth",
        "earth",
        0.0,
        table(
            (1.000_002_61, 0.000_005_62),
            (0.016_711_23, -0.000_043_92),
            (-0.000_015_31, -0.012_946_68),
            (100.464_571_66, 35_999.372_449_81),
            (102.937_681_93, 0.323_273_64),
            LinearTerm::constant(0.0),
        ),
    ),
];

impl Body {
    /// Every body, in drawing order
    pub const ALL: [Body; 11] = [
        Body::Pluto,
        Body::Neptune,
        Body::Uranus,
        Body::Saturn,
        Body::Jupiter,
        Body::Mars,
        Body::Sun,
        Body::Mercury,
        Body::Venus,
        Body::Moon,
        Body::Earth,
    ];

    /// The bodies that appear on the sky as seen from Earth
    pub fn visible() -> impl Iterator<Item = Body> {
        Body::ALL.into_iter().filter(|b| *b != Body::Earth)
    }

    pub fn record(&self) -> &'static BodyRecord {
        &RECORDS[*self as usize]
    }

    /// Get the body's name as a string
    pub fn name(&self) -> &'static str {
        self.record().name
    }

    /// Looks a body up by name, ignoring case
    pub fn from_name(name: &str) -> Option<Body> {
        Body::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Altitude of the body's centre when it rises or sets, in degrees
    pub fn horizon_correction(&self) -> f64 {
        self.record().horizon_correction
    }

    pub fn update_frequency_ms(&self) -> i64 {
        self.record().update_frequency_ms
    }

    pub fn image_size(&self) -> f64 {
        self.record().image_size
    }

    /// Orbital elements at `time`
    ///
    /// Only the Earth and the planets carry element tables; the Sun and Moon
    /// return [`SkyframeError::NoOrbitalElements`].
    pub fn orbital_elements(&self, time: &DateTime<Utc>) -> Result<OrbitalElements> {
        self.orbital_elements_at_centuries(julian_centuries(time))
    }

    /// Orbital elements `centuries` Julian centuries after J2000.0
    pub fn orbital_elements_at_centuries(&self, centuries: f64) -> Result<OrbitalElements> {
        self.record()
            .elements
            .map(|table| table.at(centuries))
            .ok_or(SkyframeError::NoOrbitalElements(*self))
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Body {
    type Err = SkyframeError;

    fn from_str(s: &str) -> Result<Self> {
        Body::from_name(s)
            .ok_or_else(|| SkyframeError::InvalidInput(format!("unknown body {:?}", s)))
    }
}
