//! Tests for coordinate rounding and distance

use super::*;

#[test]
fn test_coordinate_accepts_valid_range() {
    assert!(Coordinate::new(30.7333, 76.7794).is_ok());
    assert!(Coordinate::new(-90.0, 180.0).is_ok());
}

#[test]
fn test_coordinate_rejects_invalid_latitude() {
    let result = Coordinate::new(91.0, 0.0);
    assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
}

#[test]
fn test_coordinate_rejects_non_finite() {
    assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    assert!(matches!(
        Coordinate::new(0.0, f64::INFINITY),
        Err(CoordError::InvalidLongitude(_))
    ));
}

#[test]
fn test_nearby_samples_share_location_key() {
    // Both round to 30.7333, 76.7794
    let a = LocationKey::from_degrees(30.73331, 76.77941);
    let b = LocationKey::from_degrees(30.73334, 76.77944);
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "30.7333:76.7794");
}

#[test]
fn test_distinct_locations_have_distinct_keys() {
    let a = LocationKey::from_degrees(30.7333, 76.7794);
    let b = LocationKey::from_degrees(30.7334, 76.7794);
    assert_ne!(a, b);
}

#[test]
fn test_negative_coordinates_round_symmetrically() {
    let key = LocationKey::from_degrees(-12.34567, -45.67891);
    assert!((key.lat() - -12.3457).abs() < 1e-9);
    assert!((key.lon() - -45.6789).abs() < 1e-9);
}

#[test]
fn test_rounded_coordinate() {
    let c = Coordinate { lat: 30.733349, lon: 76.779412 }.rounded();
    assert!((c.lat - 30.7333).abs() < 1e-9);
    assert!((c.lon - 76.7794).abs() < 1e-9);
}

#[test]
fn test_round_to_three_places() {
    assert!((round_to(0.288571, 3) - 0.289).abs() < 1e-12);
    assert!((round_to(-0.0004, 3) - 0.0).abs() < 1e-12);
}

#[test]
fn test_haversine_zero_distance() {
    let a = Coordinate { lat: 30.0, lon: 76.0 };
    assert!(haversine_km(a, a).abs() < 1e-9);
}

#[test]
fn test_haversine_one_degree_longitude_at_equator() {
    let a = Coordinate { lat: 0.0, lon: 0.0 };
    let b = Coordinate { lat: 0.0, lon: 1.0 };
    assert!((haversine_km(a, b) - 111.195).abs() < 0.01);
}

#[test]
fn test_haversine_is_symmetric() {
    let a = Coordinate { lat: 30.7333, lon: 76.7794 };
    let b = Coordinate { lat: 28.6139, lon: 77.2090 };
    let d1 = haversine_km(a, b);
    let d2 = haversine_km(b, a);
    assert!((d1 - d2).abs() < 1e-9);
    // Chandigarh to Delhi is roughly 238 km
    assert!((d1 - 238.0).abs() < 5.0);
}
