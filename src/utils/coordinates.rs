use crate::error::{PipelineError, Result};

/// Convert DMS (Degrees:Minutes:Seconds) notation to decimal degrees
///
/// # Examples
/// ```
/// use weather_etl::utils::dms_to_decimal;
///
/// let decimal = dms_to_decimal("45:30:00").unwrap();
/// assert!((decimal - 45.5).abs() < 0.000001);
/// ```
pub fn dms_to_decimal(dms: &str) -> Result<f64> {
    let parts: Vec<&str> = dms.split(':').collect();

    if parts.len() != 3 {
        return Err(PipelineError::InvalidCoordinate(format!(
            "Invalid DMS format: '{}'. Expected format: 'DD:MM:SS'",
            dms
        )));
    }

    let is_negative = dms.starts_with('-');

    let component = |value: &str, label: &str| {
        value.parse::<f64>().map_err(|_| {
            PipelineError::InvalidCoordinate(format!("Invalid {} value: '{}'", label, value))
        })
    };

    let degrees = component(parts[0], "degrees")?;
    let minutes = component(parts[1], "minutes")?;
    let seconds = component(parts[2], "seconds")?;

    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(PipelineError::InvalidCoordinate(format!(
            "Minutes and seconds must be in [0, 60): '{}'",
            dms
        )));
    }

    let decimal_value = degrees.abs() + minutes / 60.0 + seconds / 3600.0;

    Ok(if is_negative {
        -decimal_value
    } else {
        decimal_value
    })
}

/// Parse a coordinate given either as decimal degrees or as DMS
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let trimmed = coord_str.trim();

    if trimmed.contains(':') {
        dms_to_decimal(trimmed)
    } else {
        trimmed.parse::<f64>().map_err(|_| {
            PipelineError::InvalidCoordinate(format!("Invalid coordinate value: '{}'", coord_str))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dms_to_decimal() {
        assert!((dms_to_decimal("49:11:42").unwrap() - 49.195).abs() < 0.000001);
        assert!((dms_to_decimal("-123:10:55").unwrap() - -123.181944).abs() < 0.000001);
    }

    #[test]
    fn test_invalid_dms_format() {
        assert!(dms_to_decimal("49:11").is_err());
        assert!(dms_to_decimal("49:75:00").is_err());
        assert!(dms_to_decimal("49:11:61").is_err());
        assert!(dms_to_decimal("north:11:00").is_err());
    }

    #[test]
    fn test_parse_coordinate() {
        assert!((parse_coordinate("49.195").unwrap() - 49.195).abs() < 0.000001);
        assert!((parse_coordinate(" -123.18 ").unwrap() - -123.18).abs() < 0.000001);
        assert!((parse_coordinate("49:11:42").unwrap() - 49.195).abs() < 0.000001);
        assert!(parse_coordinate("").is_err());
    }
}
