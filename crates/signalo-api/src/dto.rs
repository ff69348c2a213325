//! Wire DTOs and their decoding into domain types.
//!
//! Every endpoint has an explicit serde shape here; conversion into the
//! domain model is a fallible step that turns shape surprises into
//! `Validation` errors instead of letting them leak to use-sites. The
//! backend serialises coordinates and distances as strings; those are
//! parsed here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signalo_core::error::{Result, SignaloError};
use signalo_core::geo::GeoPoint;
use signalo_core::report::{Report, ReportImage, ReportStatus, ReportTarget};
use signalo_core::route::RouteLine;
use signalo_core::stop::{NearbyStop, Stop};
use signalo_core::user::UserProfile;

// ============================================================================
// Envelopes
// ============================================================================

/// The backend's standard `{ "data": ... }` wrapper.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Paginated listing: the report list nests one level deeper
/// (`{ "data": { "data": [...] } }`).
#[derive(Debug, Deserialize)]
pub struct PagedEnvelope<T> {
    pub data: PageDto<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PageDto<T> {
    #[serde(default)]
    pub data: Vec<T>,
}

/// Error body shape (`{ "message": ... }`), also used by plain-2xx
/// endpoints that only acknowledge.
#[derive(Debug, Deserialize)]
pub struct MessageDto {
    pub message: Option<String>,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub use_email: &'a str,
    pub use_password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub use_username: &'a str,
    pub use_email: &'a str,
    pub use_password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

// ============================================================================
// Reference data
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StopDto {
    pub sto_id: i64,
    pub sto_name: String,
    pub sto_latitude: String,
    pub sto_longitude: String,
    #[serde(default)]
    pub routes: Vec<RouteDto>,
    /// Present only on the proximity query, in kilometres.
    pub distance: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RouteDto {
    pub rou_id: i64,
    pub rou_code: String,
}

impl TryFrom<StopDto> for Stop {
    type Error = SignaloError;

    fn try_from(dto: StopDto) -> Result<Stop> {
        let latitude = parse_coord(&dto.sto_latitude, "sto_latitude")?;
        let longitude = parse_coord(&dto.sto_longitude, "sto_longitude")?;
        Ok(Stop {
            id: dto.sto_id,
            name: dto.sto_name,
            latitude,
            longitude,
            route_codes: dto.routes.into_iter().map(|r| r.rou_code).collect(),
        })
    }
}

impl StopDto {
    /// Decodes a proximity-query row, which must carry a distance.
    pub fn into_nearby(self) -> Result<NearbyStop> {
        let distance = self.distance.clone().ok_or_else(|| {
            SignaloError::validation("nearby stop is missing its distance field")
        })?;
        let distance_km = distance
            .parse::<f64>()
            .map_err(|_| SignaloError::validation(format!("distance is not numeric: {distance}")))?;
        Ok(NearbyStop {
            stop: self.try_into()?,
            distance_km,
        })
    }
}

impl From<RouteDto> for RouteLine {
    fn from(dto: RouteDto) -> RouteLine {
        RouteLine {
            id: dto.rou_id,
            code: dto.rou_code,
        }
    }
}

fn parse_coord(raw: &str, field: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|_| SignaloError::validation(format!("{field} is not numeric: {raw}")))
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UserDto {
    pub use_id: i64,
    pub use_username: String,
    pub use_email: String,
    pub use_avatar: Option<String>,
}

impl From<UserDto> for UserProfile {
    fn from(dto: UserDto) -> UserProfile {
        UserProfile {
            id: dto.use_id,
            username: dto.use_username,
            email: dto.use_email,
            avatar_path: dto.use_avatar,
        }
    }
}

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ReportDto {
    pub rep_id: i64,
    #[serde(default)]
    pub rep_message: Option<String>,
    pub rep_type: String,
    pub rep_sto_id: Option<i64>,
    pub rep_rou_id: Option<i64>,
    pub rep_status: String,
    /// Joined-in stop, when the report targets one.
    #[serde(default)]
    pub stop: Option<StopRefDto>,
    /// Joined-in route, when the report targets one.
    #[serde(default)]
    pub route: Option<RouteRefDto>,
    #[serde(default)]
    pub rep_latitude: Option<String>,
    #[serde(default)]
    pub rep_longitude: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageDto>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct StopRefDto {
    pub sto_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RouteRefDto {
    pub rou_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageDto {
    pub img_id: i64,
    pub img_path: String,
}

impl TryFrom<ReportDto> for Report {
    type Error = SignaloError;

    fn try_from(dto: ReportDto) -> Result<Report> {
        let target = match (dto.rep_sto_id, dto.rep_rou_id) {
            (Some(id), None) => ReportTarget::Stop {
                id,
                name: dto.stop.map(|s| s.sto_name),
            },
            (None, Some(id)) => ReportTarget::Route {
                id,
                code: dto.route.map(|r| r.rou_code),
            },
            (Some(_), Some(_)) => {
                return Err(SignaloError::validation(
                    "report targets both a stop and a route",
                ));
            }
            (None, None) => {
                return Err(SignaloError::validation(
                    "report targets neither a stop nor a route",
                ));
            }
        };

        let status: ReportStatus = dto.rep_status.parse().map_err(|_| {
            SignaloError::validation(format!("unknown report status: {}", dto.rep_status))
        })?;

        let location = match (dto.rep_latitude, dto.rep_longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(
                parse_coord(&lat, "rep_latitude")?,
                parse_coord(&lon, "rep_longitude")?,
            )),
            _ => None,
        };

        Ok(Report {
            id: dto.rep_id,
            message: dto.rep_message.unwrap_or_default(),
            report_type: dto.rep_type,
            target,
            status,
            images: dto
                .images
                .into_iter()
                .map(|img| ReportImage {
                    id: img.img_id,
                    path: img.img_path,
                })
                .collect(),
            location,
            created_at: dto.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_decode_parses_string_coordinates() {
        let json = r#"{
            "sto_id": 4,
            "sto_name": "Bel-Air",
            "sto_latitude": "46.2044",
            "sto_longitude": "6.1432",
            "routes": [{"rou_id": 1, "rou_code": "12"}]
        }"#;
        let dto: StopDto = serde_json::from_str(json).unwrap();
        let stop: Stop = dto.try_into().unwrap();
        assert_eq!(stop.name, "Bel-Air");
        assert!((stop.latitude - 46.2044).abs() < 1e-9);
        assert_eq!(stop.route_codes, vec!["12".to_string()]);
    }

    #[test]
    fn test_stop_decode_rejects_bad_coordinates() {
        let json = r#"{
            "sto_id": 4,
            "sto_name": "Bel-Air",
            "sto_latitude": "north-ish",
            "sto_longitude": "6.1432"
        }"#;
        let dto: StopDto = serde_json::from_str(json).unwrap();
        let err = Stop::try_from(dto).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_nearby_decode_requires_distance() {
        let json = r#"{
            "sto_id": 4,
            "sto_name": "Bel-Air",
            "sto_latitude": "46.2044",
            "sto_longitude": "6.1432",
            "distance": "0.345"
        }"#;
        let dto: StopDto = serde_json::from_str(json).unwrap();
        let nearby = dto.into_nearby().unwrap();
        assert!((nearby.distance_km - 0.345).abs() < 1e-9);
        assert_eq!(nearby.distance_label(), "345 m");

        let json = r#"{
            "sto_id": 4,
            "sto_name": "Bel-Air",
            "sto_latitude": "46.2044",
            "sto_longitude": "6.1432"
        }"#;
        let dto: StopDto = serde_json::from_str(json).unwrap();
        assert!(dto.into_nearby().unwrap_err().is_validation());
    }

    #[test]
    fn test_report_decode_builds_stop_target() {
        let json = r#"{
            "rep_id": 9,
            "rep_message": "vitre cassée",
            "rep_type": "dégât matériel",
            "rep_sto_id": 4,
            "rep_rou_id": null,
            "rep_status": "envoyé",
            "stop": {"sto_name": "Bel-Air"},
            "images": [{"img_id": 1, "img_path": "/storage/reports/1.jpg"}]
        }"#;
        let dto: ReportDto = serde_json::from_str(json).unwrap();
        let report: Report = dto.try_into().unwrap();
        assert_eq!(
            report.target,
            ReportTarget::Stop {
                id: 4,
                name: Some("Bel-Air".to_string())
            }
        );
        assert_eq!(report.status, ReportStatus::Submitted);
        assert_eq!(report.images.len(), 1);
    }

    #[test]
    fn test_report_decode_rejects_double_target() {
        let json = r#"{
            "rep_id": 9,
            "rep_type": "autre",
            "rep_sto_id": 4,
            "rep_rou_id": 2,
            "rep_status": "envoyé"
        }"#;
        let dto: ReportDto = serde_json::from_str(json).unwrap();
        assert!(Report::try_from(dto).unwrap_err().is_validation());
    }

    #[test]
    fn test_report_decode_rejects_missing_target() {
        let json = r#"{
            "rep_id": 9,
            "rep_type": "autre",
            "rep_sto_id": null,
            "rep_rou_id": null,
            "rep_status": "envoyé"
        }"#;
        let dto: ReportDto = serde_json::from_str(json).unwrap();
        assert!(Report::try_from(dto).unwrap_err().is_validation());
    }

    #[test]
    fn test_report_decode_rejects_unknown_status() {
        let json = r#"{
            "rep_id": 9,
            "rep_type": "autre",
            "rep_sto_id": 4,
            "rep_rou_id": null,
            "rep_status": "archived"
        }"#;
        let dto: ReportDto = serde_json::from_str(json).unwrap();
        assert!(Report::try_from(dto).unwrap_err().is_validation());
    }

    #[test]
    fn test_paged_envelope_unwraps_nested_data() {
        let json = r#"{"data": {"data": [{"rou_id": 1, "rou_code": "12"}], "total": 1}}"#;
        let page: PagedEnvelope<RouteDto> = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.data.len(), 1);
    }
}
