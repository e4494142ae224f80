use crate::model::TemperatureResult;

const KELVIN_OFFSET: f64 = 273.15;

/// Derive Fahrenheit and Kelvin from a Celsius reading.
///
/// Kelvin is rounded to two decimal places; that rounded value is the one
/// callers observe.
pub fn convert(temp_c: f64) -> TemperatureResult {
    TemperatureResult {
        temp_c,
        temp_f: temp_c * 1.8 + 32.0,
        temp_k: round2(temp_c + KELVIN_OFFSET),
    }
}

/// Round to two decimals through the exact decimal expansion, so binary
/// values just below a half-way point round down.
fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}
