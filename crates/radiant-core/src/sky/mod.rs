//! Sun and sky description
//!
//! Produces a `gensky` command followed by the glow and source primitives
//! that turn the generated sky function into a sky dome and a ground.

mod zone;

use crate::primitive::{Identifier, Primitive, PrimitiveKind, SceneText};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub use zone::TimeZone;

/// CIE sky distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyDistribution {
    #[default]
    Sunny,
    Cloudy,
    Intermediate,
    UniformCloudy,
}

impl SkyDistribution {
    /// gensky option selecting this distribution
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Sunny => "+s",
            Self::Cloudy => "-c",
            Self::Intermediate => "+i",
            Self::UniformCloudy => "-u",
        }
    }
}

/// How the local time is anchored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimeMode {
    /// Local standard time at an explicit standard meridian (degrees)
    Meridian { hour: u8, minute: u8, meridian: f64 },
    /// Local clock time in a named zone
    Zoned {
        hour: u8,
        minute: u8,
        zone: TimeZone,
        #[serde(default)]
        is_dst: bool,
    },
}

impl TimeMode {
    fn clock(&self) -> (u8, u8) {
        match *self {
            Self::Meridian { hour, minute, .. } | Self::Zoned { hour, minute, .. } => {
                (hour, minute)
            }
        }
    }

    /// Time argument, plus the meridian option when anchored by meridian
    fn arguments(&self) -> String {
        let (hour, minute) = self.clock();
        match *self {
            Self::Meridian { meridian, .. } => format!("{}:{:02} -m {}", hour, minute, meridian),
            Self::Zoned { zone, is_dst, .. } => {
                format!("{}:{:02}{}", hour, minute, zone.code(is_dst))
            }
        }
    }
}

/// Date, time and site of the sky
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyConfig {
    pub month: u8,
    pub day: u8,
    #[serde(default)]
    pub distribution: SkyDistribution,
    pub time: TimeMode,
    /// Degrees north
    pub latitude: f64,
    /// Degrees west, as gensky expects
    pub longitude: f64,
    /// With a year, gensky uses its accurate solar position algorithm
    #[serde(default)]
    pub year: Option<i32>,
}

impl SkyConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(Error::InvalidParameter(format!(
                "sky month must be 1-12, got {}",
                self.month
            )));
        }
        if !(1..=31).contains(&self.day) {
            return Err(Error::InvalidParameter(format!(
                "sky day must be 1-31, got {}",
                self.day
            )));
        }
        let (hour, minute) = self.time.clock();
        if hour > 23 || minute > 59 {
            return Err(Error::InvalidParameter(format!(
                "sky time {}:{:02} is out of range",
                hour, minute
            )));
        }
        let finite = self.latitude.is_finite()
            && self.longitude.is_finite()
            && match self.time {
                TimeMode::Meridian { meridian, .. } => meridian.is_finite(),
                TimeMode::Zoned { .. } => true,
            };
        if !finite {
            return Err(Error::InvalidParameter(
                "sky site coordinates must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// The gensky command line, without the leading `!`
    pub fn directive(&self) -> String {
        let mut cmd = format!(
            "gensky {} {} {}",
            self.month,
            self.day,
            self.time.arguments()
        );
        if let Some(year) = self.year {
            cmd.push_str(&format!(" -y {}", year));
        }
        cmd.push_str(&format!(
            " {} -a {} -o {}",
            self.distribution.flag(),
            self.latitude,
            self.longitude
        ));
        cmd
    }
}

/// Ids the sky description defines, unavailable to scene entities
pub const SKY_IDS: [&str; 5] = ["skyfunc", "sky_glow", "ground_glow", "sky", "ground"];

/// Sky dome and ground primitives, fixed for every sky
pub fn sky_primitives() -> [Primitive; 4] {
    let skyfunc = Identifier::fixed("skyfunc");
    let sky_glow = Identifier::fixed("sky_glow");
    let ground_glow = Identifier::fixed("ground_glow");

    [
        Primitive::new(skyfunc.clone(), PrimitiveKind::Glow, sky_glow.clone())
            .with_floats([0.9, 0.9, 1.15, 0.0]),
        Primitive::new(sky_glow, PrimitiveKind::Source, Identifier::fixed("sky"))
            .with_floats([0.0, 0.0, 1.0, 180.0]),
        Primitive::new(skyfunc, PrimitiveKind::Glow, ground_glow.clone())
            .with_floats([1.4, 0.9, 0.6, 0.0]),
        Primitive::new(ground_glow, PrimitiveKind::Source, Identifier::fixed("ground"))
            .with_floats([0.0, 0.0, -1.0, 180.0]),
    ]
}

/// Full sky description: the gensky command then the four fixed primitives
pub fn sky_scene(config: &SkyConfig) -> Result<SceneText> {
    config.validate()?;

    let mut text = SceneText::new();
    text.push_command(&config.directive())
        .push_primitives(&sky_primitives());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pedret() -> SkyConfig {
        SkyConfig {
            month: 8,
            day: 1,
            distribution: SkyDistribution::Sunny,
            time: TimeMode::Zoned {
                hour: 16,
                minute: 0,
                zone: TimeZone::CentralEuropean,
                is_dst: true,
            },
            latitude: 42.10745931228419,
            longitude: 1.8836540623509863,
            year: Some(1990),
        }
    }

    const FIXED_PRIMITIVES: &str = "skyfunc glow sky_glow\n0\n0\n4 0.9 0.9 1.15 0\n\n\
         sky_glow source sky\n0\n0\n4 0 0 1 180\n\n\
         skyfunc glow ground_glow\n0\n0\n4 1.4 0.9 0.6 0\n\n\
         ground_glow source ground\n0\n0\n4 0 0 -1 180\n";

    #[test]
    fn test_zoned_sky_with_year() {
        let text = sky_scene(&pedret()).unwrap().into_string();
        assert!(text.starts_with("!gensky 8 1 16:00CEST -y 1990 "));
        assert!(text.contains(" -a 42.10745931228419 -o 1.8836540623509863\n"));
        assert_eq!(
            text,
            format!(
                "!gensky 8 1 16:00CEST -y 1990 +s -a 42.10745931228419 -o 1.8836540623509863\n\n{}",
                FIXED_PRIMITIVES
            )
        );
    }

    #[test]
    fn test_sky_is_byte_stable() {
        let first = sky_scene(&pedret()).unwrap();
        let second = sky_scene(&pedret()).unwrap();
        assert_eq!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_standard_time_uses_standard_table() {
        let mut config = pedret();
        config.time = TimeMode::Zoned {
            hour: 9,
            minute: 5,
            zone: TimeZone::CentralEuropean,
            is_dst: false,
        };
        let directive = config.directive();
        assert!(directive.starts_with("gensky 8 1 9:05CET "));
        assert!(!directive.contains("CEST"));
    }

    #[test]
    fn test_meridian_mode() {
        let mut config = pedret();
        config.time = TimeMode::Meridian {
            hour: 12,
            minute: 30,
            meridian: -15.0,
        };
        config.year = None;
        config.distribution = SkyDistribution::Cloudy;
        assert_eq!(
            config.directive(),
            "gensky 8 1 12:30 -m -15 -c -a 42.10745931228419 -o 1.8836540623509863"
        );
    }

    #[test]
    fn test_without_year_uses_approximate_algorithm() {
        let mut config = pedret();
        config.year = None;
        assert!(!config.directive().contains("-y"));
    }

    #[test]
    fn test_fixed_primitives_follow_directive() {
        let mut config = pedret();
        config.distribution = SkyDistribution::UniformCloudy;
        let text = sky_scene(&config).unwrap().into_string();
        assert!(text.ends_with(FIXED_PRIMITIVES));
        assert_eq!(text.matches(" glow ").count(), 2);
        assert_eq!(text.matches(" source ").count(), 2);
    }

    #[test]
    fn test_sky_ids_cover_fixed_primitives() {
        for prim in sky_primitives() {
            assert!(SKY_IDS.contains(&prim.id.as_str()));
            assert!(SKY_IDS.contains(&prim.modifier.as_str()));
        }
    }

    #[test]
    fn test_validation() {
        let mut config = pedret();
        config.month = 13;
        assert!(sky_scene(&config).is_err());

        let mut config = pedret();
        config.time = TimeMode::Zoned {
            hour: 24,
            minute: 0,
            zone: TimeZone::Greenwich,
            is_dst: false,
        };
        assert!(config.validate().is_err());

        let mut config = pedret();
        config.latitude = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sky_config_from_json() {
        let json = r#"{
            "month": 6,
            "day": 21,
            "distribution": "intermediate",
            "time": { "mode": "zoned", "hour": 12, "minute": 0, "zone": "EST", "is_dst": true },
            "latitude": 40.7,
            "longitude": 74.0
        }"#;
        let config: SkyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.year, None);
        assert_eq!(config.directive(), "gensky 6 21 12:00EDT +i -a 40.7 -o 74");
    }
}
