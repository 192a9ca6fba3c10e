use geo_types::Point;
use uom::si::f64::Length;
use uom::si::length::meter;

/// spherical earth radius used by the haversine formula
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// great-circle distance between two points on a spherical earth
pub trait SphericalDistance {
    fn spherical_distance(&self, other: &Point<f64>) -> Length;
}

impl SphericalDistance for Point<f64> {
    fn spherical_distance(&self, other: &Point<f64>) -> Length {
        let delta_lat = (self.y() - other.y()).abs().to_radians();
        let delta_lng = (self.x() - other.x()).abs().to_radians();
        let lat1 = self.y().to_radians();
        let lat2 = other.y().to_radians();

        let h = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        Length::new::<meter>(EARTH_RADIUS_M * c)
    }
}
