use geo_types::Point;
use serde::Deserialize;

use crate::model::TimeInterval;

pub mod datetime;

/// One export file: an object with a `timelineObjects` array.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFile {
    pub timeline_objects: Vec<TimelineObject>,
}

/// Raw element of `timelineObjects`. At most one of the two sub-objects is
/// populated; which one decides the record shape.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineObject {
    pub place_visit: Option<PlaceVisit>,
    pub activity_segment: Option<ActivitySegment>,
}

/// A stay at a single location.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceVisit {
    pub location: Option<Location>,
    pub duration: Option<Duration>,
}

/// A movement between two locations, optionally with intermediate path data.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySegment {
    pub start_location: Option<Location>,
    pub end_location: Option<Location>,
    pub waypoint_path: Option<WaypointPath>,
    pub transit_path: Option<TransitPath>,
    pub simplified_raw_path: Option<SimplifiedRawPath>,
    pub duration: Option<Duration>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude_e7: Option<i64>,
    pub longitude_e7: Option<i64>,
}

impl Location {
    fn coordinate(&self) -> Option<RawCoordinate> {
        Some(RawCoordinate {
            latitude_e7: self.latitude_e7?,
            longitude_e7: self.longitude_e7?,
        })
    }
}

#[derive(Deserialize)]
pub struct WaypointPath {
    pub waypoints: Vec<Waypoint>,
}

/// Path point shape shared by `waypointPath` and `simplifiedRawPath`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub lat_e7: i64,
    pub lng_e7: i64,
}

impl Waypoint {
    fn coordinate(&self) -> RawCoordinate {
        RawCoordinate {
            latitude_e7: self.lat_e7,
            longitude_e7: self.lng_e7,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitPath {
    pub transit_stops: Vec<TransitStop>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitStop {
    pub latitude_e7: i64,
    pub longitude_e7: i64,
}

impl TransitStop {
    fn coordinate(&self) -> RawCoordinate {
        RawCoordinate {
            latitude_e7: self.latitude_e7,
            longitude_e7: self.longitude_e7,
        }
    }
}

#[derive(Deserialize)]
pub struct SimplifiedRawPath {
    pub points: Vec<Waypoint>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duration {
    pub start_timestamp: String,
    pub end_timestamp: String,
}

impl From<Duration> for TimeInterval {
    fn from(duration: Duration) -> Self {
        TimeInterval::Known {
            start: duration.start_timestamp,
            end: duration.end_timestamp,
        }
    }
}

/// A position in ten-millionths of a degree, as stored in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCoordinate {
    pub latitude_e7: i64,
    pub longitude_e7: i64,
}

impl RawCoordinate {
    fn in_range(&self) -> bool {
        (-900_000_000..=900_000_000).contains(&self.latitude_e7)
            && (-1_800_000_000..=1_800_000_000).contains(&self.longitude_e7)
    }

    /// Decimal-degree point, x = longitude, y = latitude.
    pub fn to_point(self) -> Point<f64> {
        Point::new(
            self.longitude_e7 as f64 / 1e7,
            self.latitude_e7 as f64 / 1e7,
        )
    }
}

/// Closed variant over the record shapes found in an export.
pub enum TimelineRecord {
    Visit(PlaceVisit),
    Activity(ActivitySegment),
    Unknown,
}

impl From<TimelineObject> for TimelineRecord {
    fn from(object: TimelineObject) -> Self {
        match (object.place_visit, object.activity_segment) {
            (Some(visit), _) => TimelineRecord::Visit(visit),
            (None, Some(activity)) => TimelineRecord::Activity(activity),
            (None, None) => TimelineRecord::Unknown,
        }
    }
}

/// Outcome of coordinate extraction for one record.
#[derive(Debug)]
pub enum Extraction {
    /// coordinate candidates plus the interval they belong to
    Matched {
        coordinates: Vec<RawCoordinate>,
        interval: TimeInterval,
    },
    /// the record legitimately carries no usable position
    Dropped,
    /// a required field is missing or invalid; counts toward the error stats
    Malformed,
}

impl TimelineRecord {
    pub fn extract(self) -> Extraction {
        match self {
            TimelineRecord::Visit(visit) => extract_visit(visit),
            TimelineRecord::Activity(activity) => extract_activity(activity),
            TimelineRecord::Unknown => Extraction::Dropped,
        }
    }
}

fn extract_visit(visit: PlaceVisit) -> Extraction {
    let location = match visit.location {
        Some(location) => location,
        None => return Extraction::Dropped,
    };
    // a minority of place visits carry no coordinates; those are expected
    let latitude_e7 = match location.latitude_e7 {
        Some(latitude_e7) => latitude_e7,
        None => return Extraction::Dropped,
    };
    let longitude_e7 = match location.longitude_e7 {
        Some(longitude_e7) => longitude_e7,
        None => return Extraction::Malformed,
    };
    let coordinate = RawCoordinate {
        latitude_e7,
        longitude_e7,
    };
    if !coordinate.in_range() {
        return Extraction::Malformed;
    }
    Extraction::Matched {
        coordinates: vec![coordinate],
        interval: interval_of(visit.duration),
    }
}

fn extract_activity(activity: ActivitySegment) -> Extraction {
    // start and end are required; everything below them is optional
    let mut coordinates = Vec::new();
    for location in [&activity.start_location, &activity.end_location] {
        match location.as_ref().and_then(Location::coordinate) {
            Some(coordinate) => coordinates.push(coordinate),
            None => return Extraction::Malformed,
        }
    }
    if let Some(path) = &activity.waypoint_path {
        coordinates.extend(path.waypoints.iter().map(Waypoint::coordinate));
    }
    if let Some(path) = &activity.transit_path {
        coordinates.extend(path.transit_stops.iter().map(TransitStop::coordinate));
    }
    if let Some(path) = &activity.simplified_raw_path {
        coordinates.extend(path.points.iter().map(Waypoint::coordinate));
    }
    if coordinates.iter().any(|coordinate| !coordinate.in_range()) {
        return Extraction::Malformed;
    }
    Extraction::Matched {
        coordinates,
        interval: interval_of(activity.duration),
    }
}

fn interval_of(duration: Option<Duration>) -> TimeInterval {
    duration.map_or(TimeInterval::Unknown, TimeInterval::from)
}

#[cfg(test)]
mod tests {
    use super::{Extraction, RawCoordinate, TimelineObject, TimelineRecord};
    use crate::model::TimeInterval;
    use serde_json::json;

    fn record(value: serde_json::Value) -> TimelineRecord {
        serde_json::from_value::<TimelineObject>(value).unwrap().into()
    }

    #[test]
    fn place_visit_yields_its_location_and_interval() {
        let extraction = record(json!({
            "placeVisit": {
                "location": {"latitudeE7": 50_000_000, "longitudeE7": 0},
                "duration": {
                    "startTimestamp": "2020-01-01T09:00:00Z",
                    "endTimestamp": "2020-01-01T10:00:00Z"
                }
            }
        }))
        .extract();

        match extraction {
            Extraction::Matched {
                coordinates,
                interval,
            } => {
                assert_eq!(
                    coordinates,
                    vec![RawCoordinate {
                        latitude_e7: 50_000_000,
                        longitude_e7: 0
                    }]
                );
                assert_eq!(
                    interval,
                    TimeInterval::Known {
                        start: "2020-01-01T09:00:00Z".to_string(),
                        end: "2020-01-01T10:00:00Z".to_string()
                    }
                );
            }
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn place_visit_without_location_is_dropped() {
        let extraction = record(json!({"placeVisit": {}})).extract();
        assert!(matches!(extraction, Extraction::Dropped));
    }

    #[test]
    fn place_visit_without_latitude_is_dropped() {
        let extraction = record(json!({
            "placeVisit": {"location": {"placeId": "ChIJ"}}
        }))
        .extract();
        assert!(matches!(extraction, Extraction::Dropped));
    }

    #[test]
    fn place_visit_with_half_a_coordinate_is_malformed() {
        let extraction = record(json!({
            "placeVisit": {"location": {"latitudeE7": 50_000_000}}
        }))
        .extract();
        assert!(matches!(extraction, Extraction::Malformed));
    }

    #[test]
    fn activity_segment_without_end_location_is_malformed() {
        let extraction = record(json!({
            "activitySegment": {
                "startLocation": {"latitudeE7": 50_000_000, "longitudeE7": 0}
            }
        }))
        .extract();
        assert!(matches!(extraction, Extraction::Malformed));
    }

    #[test]
    fn activity_segment_collects_every_path_source_in_order() {
        let extraction = record(json!({
            "activitySegment": {
                "startLocation": {"latitudeE7": 1, "longitudeE7": 2},
                "endLocation": {"latitudeE7": 3, "longitudeE7": 4},
                "waypointPath": {"waypoints": [{"latE7": 5, "lngE7": 6}]},
                "transitPath": {"transitStops": [{"latitudeE7": 7, "longitudeE7": 8}]},
                "simplifiedRawPath": {"points": [{"latE7": 9, "lngE7": 10}]},
                "duration": {
                    "startTimestamp": "2020-01-01T09:00:00Z",
                    "endTimestamp": "2020-01-01T10:00:00Z"
                }
            }
        }))
        .extract();

        match extraction {
            Extraction::Matched { coordinates, .. } => {
                let pairs: Vec<(i64, i64)> = coordinates
                    .iter()
                    .map(|c| (c.latitude_e7, c.longitude_e7))
                    .collect();
                assert_eq!(pairs, vec![(1, 2), (3, 4), (5, 6), (7, 8), (9, 10)]);
            }
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn activity_segment_without_optional_paths_still_matches() {
        let extraction = record(json!({
            "activitySegment": {
                "startLocation": {"latitudeE7": 1, "longitudeE7": 2},
                "endLocation": {"latitudeE7": 3, "longitudeE7": 4}
            }
        }))
        .extract();
        match extraction {
            Extraction::Matched {
                coordinates,
                interval,
            } => {
                assert_eq!(coordinates.len(), 2);
                assert_eq!(interval, TimeInterval::Unknown);
            }
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn unrecognized_record_is_dropped() {
        let extraction = record(json!({"someFutureShape": {"x": 1}})).extract();
        assert!(matches!(extraction, Extraction::Dropped));
    }

    #[test]
    fn out_of_range_coordinate_is_malformed() {
        let extraction = record(json!({
            "placeVisit": {
                "location": {"latitudeE7": 950_000_000, "longitudeE7": 0},
                "duration": {
                    "startTimestamp": "2020-01-01T09:00:00Z",
                    "endTimestamp": "2020-01-01T10:00:00Z"
                }
            }
        }))
        .extract();
        assert!(matches!(extraction, Extraction::Malformed));
    }

    #[test]
    fn raw_coordinate_converts_to_degrees() {
        let point = RawCoordinate {
            latitude_e7: 50_000_000,
            longitude_e7: -1_250_000_000,
        }
        .to_point();
        assert_eq!(point.y(), 5.0);
        assert_eq!(point.x(), -125.0);
    }
}
