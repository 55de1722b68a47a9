use std::fmt;
use std::str::FromStr;

/// Scales a Celsius reading can be displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureScale {
    #[default]
    Fahrenheit,
    Celsius,
    Kelvin,
    Rankine,
    Delisle,
    Newton,
    Reaumur,
    Romer,
}

impl TemperatureScale {
    pub fn from_celsius(&self, celsius: f64) -> f64 {
        match self {
            TemperatureScale::Fahrenheit => celsius * (9.0 / 5.0) + 32.0,
            TemperatureScale::Celsius => celsius,
            TemperatureScale::Kelvin => celsius + 273.15,
            TemperatureScale::Rankine => (celsius + 273.15) * (9.0 / 5.0),
            TemperatureScale::Delisle => (100.0 - celsius) * 1.5,
            TemperatureScale::Newton => celsius * (33.0 / 100.0),
            TemperatureScale::Reaumur => celsius * 0.8,
            TemperatureScale::Romer => celsius * (21.0 / 40.0) + 7.5,
        }
    }

    /// Convert and round to a whole degree, halves rounding up.
    pub fn display(&self, celsius: f64) -> i64 {
        (self.from_celsius(celsius) + 0.5).floor() as i64
    }
}

impl FromStr for TemperatureScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fahrenheit" | "f" => Ok(TemperatureScale::Fahrenheit),
            "centigrade" | "celsius" | "c" => Ok(TemperatureScale::Celsius),
            "kelvin" | "k" => Ok(TemperatureScale::Kelvin),
            "rankine" => Ok(TemperatureScale::Rankine),
            "delisle" => Ok(TemperatureScale::Delisle),
            "newton" => Ok(TemperatureScale::Newton),
            "réaumur" | "reaumur" => Ok(TemperatureScale::Reaumur),
            "rømer" | "roemer" | "romer" => Ok(TemperatureScale::Romer),
            other => Err(format!("unknown temperature scale: {other}")),
        }
    }
}

impl fmt::Display for TemperatureScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TemperatureScale::Fahrenheit => "fahrenheit",
            TemperatureScale::Celsius => "celsius",
            TemperatureScale::Kelvin => "kelvin",
            TemperatureScale::Rankine => "rankine",
            TemperatureScale::Delisle => "delisle",
            TemperatureScale::Newton => "newton",
            TemperatureScale::Reaumur => "réaumur",
            TemperatureScale::Romer => "rømer",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("F".parse::<TemperatureScale>(), Ok(TemperatureScale::Fahrenheit));
        assert_eq!("centigrade".parse::<TemperatureScale>(), Ok(TemperatureScale::Celsius));
        assert_eq!("k".parse::<TemperatureScale>(), Ok(TemperatureScale::Kelvin));
        assert_eq!("Réaumur".parse::<TemperatureScale>(), Ok(TemperatureScale::Reaumur));
        assert_eq!("roemer".parse::<TemperatureScale>(), Ok(TemperatureScale::Romer));
        assert!("gas mark".parse::<TemperatureScale>().is_err());
    }

    #[test]
    fn test_known_conversions() {
        assert_eq!(TemperatureScale::Fahrenheit.display(100.0), 212);
        assert_eq!(TemperatureScale::Fahrenheit.display(-40.0), -40);
        assert_eq!(TemperatureScale::Celsius.display(21.4), 21);
        assert_eq!(TemperatureScale::Kelvin.display(0.0), 273);
        assert_eq!(TemperatureScale::Rankine.display(0.0), 492);
        assert_eq!(TemperatureScale::Delisle.display(100.0), 0);
        assert_eq!(TemperatureScale::Delisle.display(0.0), 150);
        assert_eq!(TemperatureScale::Newton.display(100.0), 33);
        assert_eq!(TemperatureScale::Reaumur.display(100.0), 80);
        assert_eq!(TemperatureScale::Romer.display(100.0), 60);
    }

    #[test]
    fn test_halves_round_up() {
        assert_eq!(TemperatureScale::Celsius.display(2.5), 3);
        assert_eq!(TemperatureScale::Celsius.display(-2.5), -2);
    }
}
