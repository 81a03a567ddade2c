//! Coordinate transformations between the graph, the schedule and the
//! search engine.

use geo_types::Coord;

/// Maps a coordinate from one reference system into another.
pub trait CoordinateTransform {
    fn transform(&self, coord: Coord<f64>) -> Coord<f64>;
}

/// Leaves coordinates unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl CoordinateTransform for Identity {
    fn transform(&self, coord: Coord<f64>) -> Coord<f64> {
        coord
    }
}

impl<F> CoordinateTransform for F
where
    F: Fn(Coord<f64>) -> Coord<f64>,
{
    fn transform(&self, coord: Coord<f64>) -> Coord<f64> {
        self(coord)
    }
}
