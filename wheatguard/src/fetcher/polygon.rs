//! Polygon ring handling for averaged lookups.
//!
//! A ring's average is taken over every ring position, so a closed ring
//! counts its first vertex twice. Each distinct location is still fetched
//! only once.

use crate::coord::{round_to, Coordinate, LocationKey};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::VALUE_PRECISION;

/// Result of averaging the index over a polygon's vertices.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PolygonAverage {
    /// Mean of the available vertex values.
    Value {
        average: f64,
        /// Ring positions that contributed a value
        vertices_used: usize,
        /// Location the average is recorded against (the first vertex)
        representative: Coordinate,
    },
    /// No vertex produced a value.
    NoData,
}

impl PolygonAverage {
    pub(crate) fn from_values(values: &[f64], representative: Coordinate) -> Self {
        if values.is_empty() {
            return Self::NoData;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Self::Value {
            average: round_to(mean, VALUE_PRECISION),
            vertices_used: values.len(),
            representative,
        }
    }

    /// The average, if any vertex was available.
    pub fn average(&self) -> Option<f64> {
        match self {
            Self::Value { average, .. } => Some(*average),
            Self::NoData => None,
        }
    }
}

/// Distinct vertex locations of a ring, in ring order.
pub fn distinct_vertices(ring: &[Coordinate]) -> Vec<Coordinate> {
    let mut seen = HashSet::new();
    ring.iter()
        .copied()
        .filter(|coord| seen.insert(coord.location_key()))
        .collect()
}

/// Expands per-location results back onto every ring position.
pub(crate) fn ring_values(
    ring: &[Coordinate],
    fetched: &HashMap<LocationKey, Option<f64>>,
) -> Vec<f64> {
    ring.iter()
        .filter_map(|coord| fetched.get(&coord.location_key()).copied().flatten())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_closed_ring_fetches_first_vertex_once() {
        let ring = [c(1.0, 1.0), c(1.0, 2.0), c(2.0, 2.0), c(1.0, 1.0)];
        assert_eq!(distinct_vertices(&ring), ring[..3].to_vec());
    }

    #[test]
    fn test_open_ring_unchanged() {
        let ring = [c(1.0, 1.0), c(1.0, 2.0), c(2.0, 2.0)];
        assert_eq!(distinct_vertices(&ring), ring.to_vec());
    }

    #[test]
    fn test_single_vertex_kept() {
        assert_eq!(distinct_vertices(&[c(1.0, 1.0)]).len(), 1);
    }

    #[test]
    fn test_ring_values_repeat_shared_vertices() {
        let ring = [c(1.0, 1.0), c(1.0, 2.0), c(2.0, 2.0), c(1.0, 1.0)];
        let fetched = HashMap::from([
            (ring[0].location_key(), Some(0.5)),
            (ring[1].location_key(), None),
            (ring[2].location_key(), Some(0.1)),
        ]);

        assert_eq!(ring_values(&ring, &fetched), vec![0.5, 0.1, 0.5]);
    }

    #[test]
    fn test_average_rounding() {
        let avg = PolygonAverage::from_values(&[0.1, 0.2, 0.25], c(0.0, 0.0));
        assert_eq!(avg.average(), Some(0.183));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(PolygonAverage::NoData).unwrap();
        assert_eq!(json["status"], "no_data");
    }
}
