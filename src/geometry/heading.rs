//! Compass heading arithmetic
//!
//! The difference functions reject headings outside `[0, 360)` instead of
//! wrapping them; loaders wrap with [`normalize_heading`] first.

use super::GeoError;

fn check_range(initial: f64, final_heading: f64) -> Result<(), GeoError> {
    let valid = |h: f64| (0.0..360.0).contains(&h);
    if valid(initial) && valid(final_heading) {
        Ok(())
    } else {
        Err(GeoError::HeadingOutOfRange {
            initial,
            final_heading,
        })
    }
}

/// Wrap any finite heading into `[0, 360)`
///
/// `rem_euclid` rounds tiny negative values up to exactly 360, which is folded
/// back to 0.
pub fn normalize_heading(heading: f64) -> f64 {
    let wrapped = heading.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Error from `initial` to `final_heading` in degrees, in `(-180, 180]`
///
/// Positive when the shortest way round is clockwise. Opposite headings report
/// +180 regardless of argument order.
pub fn signed_heading_difference(initial: f64, final_heading: f64) -> Result<f64, GeoError> {
    check_range(initial, final_heading)?;

    let diff = final_heading - initial;
    let abs_diff = diff.abs();

    let signed = if abs_diff == 180.0 {
        abs_diff
    } else if abs_diff < 180.0 {
        diff
    } else if final_heading > initial {
        abs_diff - 360.0
    } else {
        360.0 - abs_diff
    };

    Ok(signed)
}

/// Smaller of the two arcs between the headings, in `[0, 180]`
pub fn unsigned_heading_difference(initial: f64, final_heading: f64) -> Result<f64, GeoError> {
    check_range(initial, final_heading)?;

    Ok(180.0 - ((initial - final_heading).abs() - 180.0).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_difference_direction() {
        assert_eq!(signed_heading_difference(10.0, 20.0).unwrap(), 10.0);
        assert_eq!(signed_heading_difference(20.0, 10.0).unwrap(), -10.0);
        assert_eq!(signed_heading_difference(350.0, 10.0).unwrap(), 20.0);
        assert_eq!(signed_heading_difference(10.0, 350.0).unwrap(), -20.0);
    }

    #[test]
    fn test_signed_difference_at_opposite_headings() {
        assert_eq!(signed_heading_difference(0.0, 180.0).unwrap(), 180.0);
        assert_eq!(signed_heading_difference(180.0, 0.0).unwrap(), 180.0);
        assert_eq!(signed_heading_difference(90.0, 270.0).unwrap(), 180.0);
    }

    #[test]
    fn test_unsigned_difference() {
        assert_eq!(unsigned_heading_difference(10.0, 20.0).unwrap(), 10.0);
        assert_eq!(unsigned_heading_difference(350.0, 10.0).unwrap(), 20.0);
        assert_eq!(unsigned_heading_difference(10.0, 350.0).unwrap(), 20.0);
        assert_eq!(unsigned_heading_difference(0.0, 180.0).unwrap(), 180.0);
        assert_eq!(unsigned_heading_difference(123.0, 123.0).unwrap(), 0.0);
    }

    #[test]
    fn test_normalize_heading() {
        assert_eq!(normalize_heading(360.0), 0.0);
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert_eq!(normalize_heading(725.0), 5.0);
        assert_eq!(normalize_heading(123.5), 123.5);
        assert_eq!(normalize_heading(-1e-14), 0.0);
        assert!(unsigned_heading_difference(normalize_heading(-1e-14), 90.0).is_ok());
    }

    #[test]
    fn test_out_of_range_headings_are_rejected() {
        assert!(matches!(
            signed_heading_difference(-1.0, 20.0),
            Err(GeoError::HeadingOutOfRange { .. })
        ));
        assert!(signed_heading_difference(10.0, 360.0).is_err());
        assert!(unsigned_heading_difference(360.5, 0.0).is_err());
        assert!(unsigned_heading_difference(f64::NAN, 0.0).is_err());
    }
}
