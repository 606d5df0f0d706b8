//! Token validation.
//!
//! Identity issuance (login, registration) lives in an external service;
//! this module only validates the HS256 access tokens that service mints.

pub mod jwt;
