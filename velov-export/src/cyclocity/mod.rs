//! Cyclocity private API client.
//!
//! Cyclocity is the JCDecaux platform behind Vélo'v. The account endpoints
//! are not public: requests are authenticated with the session cookies of a
//! logged-in browser, copied by hand. There is no session renewal, so an
//! expired cookie shows up as a plain non-200 response.

mod client;
mod error;
mod types;

pub use client::{CyclocityClient, CyclocityConfig, SessionCookies};
pub use error::CyclocityError;
pub use types::TripsResponse;
