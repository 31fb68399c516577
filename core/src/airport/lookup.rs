use serde::{Deserialize, Serialize};

/// Failure of an airport or runway lookup.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid lookup input: {0}")]
    InvalidInput(String),
    #[error("lookup transport failure: {0}")]
    Transport(String),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// Identifies an airport by database id, ICAO or IATA code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AirportCode {
    Id(u32),
    Code(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: u32,
    pub icao: Option<String>,
    pub iata: Option<String>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Field elevation in feet.
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayEnd {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runway {
    pub id: u32,
    pub identifier: String,
    /// Magnetic heading in degrees.
    pub magnetic_heading: f64,
    pub start: RunwayEnd,
    pub end: RunwayEnd,
    /// Localizer frequency in MHz, when the runway has an ILS.
    pub localizer_frequency: Option<f64>,
}

/// Optional refinements when picking a runway at a known airport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunwayQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ils_frequency: Option<f64>,
    /// Phase the query is made for, e.g. "takeoff" or "landing".
    pub hint: Option<String>,
}

/// Ground-reference lookups backed by an external service.
pub trait AirportLookup: Send + Sync {
    fn airport(&self, code: &AirportCode) -> LookupResult<Airport>;

    fn nearest_airport(&self, latitude: f64, longitude: f64) -> LookupResult<Airport>;

    fn nearest_runway(
        &self,
        airport: &AirportCode,
        heading: f64,
        query: &RunwayQuery,
    ) -> LookupResult<Runway>;
}

pub fn validate_latitude(latitude: f64) -> LookupResult<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(LookupError::InvalidInput(format!(
            "latitude {} outside [-90, 90]",
            latitude
        )));
    }
    Ok(())
}

pub fn validate_longitude(longitude: f64) -> LookupResult<()> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(LookupError::InvalidInput(format!(
            "longitude {} outside [-180, 180]",
            longitude
        )));
    }
    Ok(())
}

pub fn validate_heading(heading: f64) -> LookupResult<()> {
    if !(0.0..360.0).contains(&heading) {
        return Err(LookupError::InvalidInput(format!(
            "heading {} outside [0, 360)",
            heading
        )));
    }
    Ok(())
}

/// Checks every bound a runway query carries.
pub fn validate_runway_query(heading: f64, query: &RunwayQuery) -> LookupResult<()> {
    validate_heading(heading)?;
    if let Some(latitude) = query.latitude {
        validate_latitude(latitude)?;
    }
    if let Some(longitude) = query.longitude {
        validate_longitude(longitude)?;
    }
    Ok(())
}

/// Stand-in that validates its inputs and then never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLookup;

impl AirportLookup for NullLookup {
    fn airport(&self, code: &AirportCode) -> LookupResult<Airport> {
        Err(LookupError::NotFound(format!("airport {:?}", code)))
    }

    fn nearest_airport(&self, latitude: f64, longitude: f64) -> LookupResult<Airport> {
        validate_latitude(latitude)?;
        validate_longitude(longitude)?;
        Err(LookupError::NotFound(format!(
            "no airport near ({}, {})",
            latitude, longitude
        )))
    }

    fn nearest_runway(
        &self,
        airport: &AirportCode,
        heading: f64,
        query: &RunwayQuery,
    ) -> LookupResult<Runway> {
        validate_runway_query(heading, query)?;
        Err(LookupError::NotFound(format!(
            "no runway at {:?} for heading {}",
            airport, heading
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_lookup_reports_not_found() {
        let lookup = NullLookup;
        assert!(matches!(
            lookup.airport(&AirportCode::Code("EGLL".into())),
            Err(LookupError::NotFound(_))
        ));
        assert!(matches!(
            lookup.nearest_airport(51.47, -0.45),
            Err(LookupError::NotFound(_))
        ));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected_before_lookup() {
        let lookup = NullLookup;
        assert!(matches!(
            lookup.nearest_airport(91.0, 0.0),
            Err(LookupError::InvalidInput(_))
        ));
        assert!(matches!(
            lookup.nearest_airport(0.0, -180.5),
            Err(LookupError::InvalidInput(_))
        ));
    }

    #[test]
    fn runway_query_checks_heading_and_position() {
        let airport = AirportCode::Id(2456);
        let lookup = NullLookup;
        assert!(matches!(
            lookup.nearest_runway(&airport, 360.0, &RunwayQuery::default()),
            Err(LookupError::InvalidInput(_))
        ));
        let query = RunwayQuery {
            latitude: Some(-95.0),
            ..Default::default()
        };
        assert!(matches!(
            lookup.nearest_runway(&airport, 270.0, &query),
            Err(LookupError::InvalidInput(_))
        ));
        assert!(matches!(
            lookup.nearest_runway(&airport, 270.0, &RunwayQuery::default()),
            Err(LookupError::NotFound(_))
        ));
    }

    #[test]
    fn airport_code_accepts_id_or_text() {
        let id: AirportCode = serde_json::from_str("2456").unwrap();
        let icao: AirportCode = serde_json::from_str("\"EGLL\"").unwrap();
        assert_eq!(id, AirportCode::Id(2456));
        assert_eq!(icao, AirportCode::Code("EGLL".into()));
    }
}
