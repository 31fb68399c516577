//! Seam to the airport and runway database. Only the contract, input
//! validation and a never-found stand-in live here.

pub mod lookup;

pub use lookup::{
    validate_heading, validate_latitude, validate_longitude, validate_runway_query, Airport,
    AirportCode, AirportLookup, LookupError, LookupResult, NullLookup, Runway, RunwayEnd,
    RunwayQuery,
};
