//! SAML 2.0 assertion types.

use chrono::{DateTime, Utc};
use fedlink_xml::DomElement;
use serde::{Deserialize, Serialize};

use super::NameId;
use crate::id::generate_id;

/// A SAML 2.0 assertion.
///
/// The `id` is preserved verbatim through parse and write round trips; a
/// signature over the assertion references it by that value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    /// Unique assertion ID.
    pub id: String,

    /// When the assertion was issued.
    pub issue_instant: DateTime<Utc>,

    /// The asserting party.
    pub issuer: NameId,

    /// An embedded signature over this assertion, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<DomElement>,

    /// The principal the statements are about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// Validity conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    /// Statements in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<Statement>,
}

impl Assertion {
    /// Creates an assertion with a fresh ID issued now.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            issue_instant: Utc::now(),
            issuer: NameId::new(issuer),
            signature: None,
            subject: None,
            conditions: None,
            statements: Vec::new(),
        }
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Sets the conditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Appends a statement.
    #[must_use]
    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }
}

/// One statement within an assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// An authentication statement.
    Authn(AuthnStatement),
    /// An attribute statement.
    Attribute(AttributeStatement),
    /// A XACML authorization decision statement, carried opaquely.
    XacmlAuthzDecision(DomElement),
}

/// The subject of an assertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Name identifier of the principal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<NameId>,

    /// An encrypted identifier, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_id: Option<DomElement>,

    /// Subject confirmations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub confirmations: Vec<SubjectConfirmation>,
}

impl Subject {
    /// Creates a subject identified by a name ID.
    #[must_use]
    pub fn new(name_id: NameId) -> Self {
        Self {
            name_id: Some(name_id),
            encrypted_id: None,
            confirmations: Vec::new(),
        }
    }

    /// Adds a confirmation.
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: SubjectConfirmation) -> Self {
        self.confirmations.push(confirmation);
        self
    }
}

/// A subject confirmation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectConfirmation {
    /// Confirmation method URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Identifier confirmed by this confirmation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<NameId>,

    /// An encrypted identifier, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_id: Option<DomElement>,

    /// Additional confirmation data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SubjectConfirmationData>,
}

impl SubjectConfirmation {
    /// Creates a bearer confirmation.
    #[must_use]
    pub fn bearer() -> Self {
        Self {
            method: Some(super::constants::confirmation_methods::BEARER.to_string()),
            name_id: None,
            encrypted_id: None,
            data: None,
        }
    }
}

/// Constraints on how a subject may be confirmed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectConfirmationData {
    /// The request ID this assertion responds to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    /// Earliest confirmation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// Latest confirmation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Endpoint the assertion may be presented to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    /// Network address of the presenter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Key material or encrypted key content, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<DomElement>,
}

/// Assertion validity conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// Time before which the assertion is not valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// Time at or after which the assertion is not valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Audience restrictions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience_restrictions: Vec<AudienceRestriction>,

    /// One-time-use condition.
    #[serde(default)]
    pub one_time_use: bool,

    /// Proxy restriction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_restriction: Option<ProxyRestriction>,
}

impl Conditions {
    /// Creates conditions valid for the given number of minutes from now.
    #[must_use]
    pub fn with_validity(minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            not_before: Some(now),
            not_on_or_after: Some(now + chrono::Duration::minutes(minutes)),
            ..Self::default()
        }
    }

    /// Adds an audience restriction with a single audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience_restrictions.push(AudienceRestriction {
            audiences: vec![audience.into()],
        });
        self
    }
}

/// An audience restriction condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudienceRestriction {
    /// Valid audiences.
    pub audiences: Vec<String>,
}

/// A proxy restriction condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyRestriction {
    /// Maximum number of intermediaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Audiences the assertion may be proxied to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audiences: Vec<String>,
}

/// An authentication statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthnStatement {
    /// When the authentication took place.
    pub authn_instant: DateTime<Utc>,

    /// Session index for logout correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_index: Option<String>,

    /// When the session ends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_not_on_or_after: Option<DateTime<Utc>>,

    /// Where the subject authenticated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_locality: Option<SubjectLocality>,

    /// How the subject authenticated.
    pub authn_context: AuthnContext,
}

impl AuthnStatement {
    /// Creates an authentication statement for a context class URI.
    #[must_use]
    pub fn new(class_ref: impl Into<String>) -> Self {
        Self {
            authn_instant: Utc::now(),
            session_index: None,
            session_not_on_or_after: None,
            subject_locality: None,
            authn_context: AuthnContext {
                class_ref: Some(class_ref.into()),
                decl_ref: None,
                authenticating_authorities: Vec::new(),
            },
        }
    }
}

/// Authentication context of an authentication statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthnContext {
    /// Context class reference URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_ref: Option<String>,

    /// Context declaration reference URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decl_ref: Option<String>,

    /// Authorities involved in the authentication.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authenticating_authorities: Vec<String>,
}

/// DNS and address information about the authenticating system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectLocality {
    /// Network address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// DNS name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
}

/// An attribute statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeStatement {
    /// Attributes of the subject.
    pub attributes: Vec<Attribute>,
}

/// A SAML attribute with its values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, typically a URI.
    pub name: String,

    /// Name format URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_format: Option<String>,

    /// Human-readable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    /// Attribute values as text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl Attribute {
    /// Creates an attribute with a single value.
    #[must_use]
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_format: None,
            friendly_name: None,
            values: vec![value.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chain() {
        let assertion = Assertion::new("http://idp")
            .with_subject(Subject::new(NameId::new("alice")).with_confirmation(
                SubjectConfirmation::bearer(),
            ))
            .with_conditions(Conditions::with_validity(5).with_audience("http://sp"))
            .with_statement(Statement::Authn(AuthnStatement::new(
                "urn:oasis:names:tc:SAML:2.0:ac:classes:Password",
            )));

        assert!(assertion.id.starts_with("ID_"));
        assert_eq!(assertion.issuer.value, "http://idp");
        assert_eq!(assertion.statements.len(), 1);
        let conditions = assertion.conditions.unwrap();
        assert_eq!(conditions.audience_restrictions[0].audiences[0], "http://sp");
    }
}
