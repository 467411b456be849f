use chrono::NaiveDate;
use serde::Deserialize;
use services::geo::Coordinate;

use crate::routes::common::optional_date;

/// Both halves or nothing.
fn coordinate(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinate> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionReq {
    #[serde(default, alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(default, alias = "longitude")]
    pub lng: Option<f64>,
}

impl StartSessionReq {
    pub fn anchor(&self) -> Option<Coordinate> {
        coordinate(self.lat, self.lng)
    }
}

/// A student's location sample. Omitting it (or sending `null`) reports that
/// the device could not provide a location.
#[derive(Debug, Default, Deserialize)]
pub struct MarkAttendanceReq {
    #[serde(default, alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(default, alias = "longitude")]
    pub lng: Option<f64>,
}

impl MarkAttendanceReq {
    pub fn sample(&self) -> Option<Coordinate> {
        coordinate(self.lat, self.lng)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionListQuery {
    #[serde(default, deserialize_with = "optional_date")]
    pub date: Option<NaiveDate>,
}
