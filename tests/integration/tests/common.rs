//! Shared fixtures for the scenario tests.

use chrono::{DateTime, Utc};
use fedlink_saml::types::{Assertion, Attribute, AttributeStatement, Statement, Status};
use fedlink_saml::types::{Response, StatusResponse};

/// A millisecond-precision instant, so values survive the writers'
/// millisecond timestamp format unchanged.
pub fn fixed_instant() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-01T12:30:45.000Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// An assertion with a deterministic ID and instant.
pub fn sample_assertion(id: &str) -> Assertion {
    let mut assertion = Assertion::new("http://idp.example.org").with_statement(
        Statement::Attribute(AttributeStatement {
            attributes: vec![Attribute::single("role", "admin")],
        }),
    );
    assertion.id = id.to_owned();
    assertion.issue_instant = fixed_instant();
    assertion
}

/// A success response carrying one assertion, deterministic throughout.
pub fn sample_response(id: &str, assertion_id: &str) -> Response {
    let mut response = Response::new(Status::success()).with_assertion(sample_assertion(assertion_id));
    response.base = StatusResponse {
        id: id.to_owned(),
        issue_instant: fixed_instant(),
        issuer: Some(fedlink_saml::types::NameId::new("http://idp.example.org")),
        ..response.base
    };
    response
}
