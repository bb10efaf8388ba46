//! Utility checks used wherever geometry enters the model.

/// Coordinates at or beyond this magnitude are treated as device noise.
pub const MAX_COORDINATE: f64 = 1.0E6;

/// Detect unrealistic coordinate values: NaN, infinities and absurdly large magnitudes.
#[must_use]
pub fn finite_sized(x: f64) -> bool {
    x.is_finite() && x < MAX_COORDINATE && x > -MAX_COORDINATE
}

/// Pass `x` through if it is [`finite_sized`].
pub fn check_coordinate(x: f64) -> Result<f64, GeometryError> {
    if finite_sized(x) {
        Ok(x)
    } else {
        Err(GeometryError::BadCoordinate(x))
    }
}

/// Pass `x` through if it is a usable, strictly positive size.
pub fn check_positive(x: f64) -> Result<f64, GeometryError> {
    if finite_sized(x) && x > 0.0 {
        Ok(x)
    } else {
        Err(GeometryError::NonPositive(x))
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("coordinate {0} is not finite or out of range")]
    BadCoordinate(f64),
    #[error("size {0} must be finite and positive")]
    NonPositive(f64),
    #[error("stroke has no points")]
    EmptyStroke,
    #[error("expected {expected} segment widths, found {found}")]
    WidthCount { expected: usize, found: usize },
    #[error("scale factor must be finite and non-zero")]
    DegenerateScale,
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn rejects_noise() {
        assert!(finite_sized(0.0));
        assert!(finite_sized(-999_999.0));
        assert!(!finite_sized(1.0E6));
        assert!(!finite_sized(f64::NAN));
        assert!(!finite_sized(f64::NEG_INFINITY));
        assert_eq!(
            check_coordinate(f64::INFINITY),
            Err(GeometryError::BadCoordinate(f64::INFINITY))
        );
    }
    #[test]
    fn positive_sizes() {
        assert_eq!(check_positive(12.0), Ok(12.0));
        assert!(check_positive(0.0).is_err());
        assert!(check_positive(-3.0).is_err());
    }
}
