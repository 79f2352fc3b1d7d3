use clap::Parser;
use measure_lib::DistanceUnit;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Measure Viewer - interactive distance measurement on a slippy map
pub struct Settings {
    /// Distance unit for annotations (m, km, mi, nmi)
    #[clap(short, long, default_value = "km", value_parser = parse_unit)]
    pub unit: DistanceUnit,

    /// Measurement line width in pixels
    #[clap(long, default_value = "3.0")]
    pub line_width: f32,

    /// Measured point marker radius in pixels
    #[clap(long, default_value = "3.5")]
    pub circle_radius: f32,

    /// Ignore previously persisted settings and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    pub fn from_cli() -> Self {
        Settings::parse()
    }
}

fn parse_unit(s: &str) -> Result<DistanceUnit, String> {
    match s {
        "m" | "meters" => Ok(DistanceUnit::Meters),
        "km" | "kilometers" => Ok(DistanceUnit::Kilometers),
        "mi" | "miles" => Ok(DistanceUnit::Miles),
        "nmi" | "nautical-miles" => Ok(DistanceUnit::NauticalMiles),
        other => Err(format!("unknown unit '{other}' (expected m, km, mi or nmi)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::parse_from(["measure-viewer"]);
        assert_eq!(settings.unit, DistanceUnit::Kilometers);
        assert_eq!(settings.line_width, 3.0);
        assert_eq!(settings.circle_radius, 3.5);
        assert!(!settings.ignore_persisted);
    }

    #[test]
    fn test_unit_aliases() {
        assert_eq!(parse_unit("m").unwrap(), DistanceUnit::Meters);
        assert_eq!(parse_unit("kilometers").unwrap(), DistanceUnit::Kilometers);
        assert_eq!(parse_unit("mi").unwrap(), DistanceUnit::Miles);
        assert_eq!(parse_unit("nmi").unwrap(), DistanceUnit::NauticalMiles);
        assert!(parse_unit("furlongs").is_err());
    }
}
