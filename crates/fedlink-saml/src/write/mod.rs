//! Writers mirroring the parsers.
//!
//! Each writer emits the canonical child order its parser accepts, so a
//! parse and write round trip is structurally stable. Opaque subtrees
//! (signatures, encrypted content, key material) are written back
//! verbatim.

pub mod assertion;
pub mod metadata;
pub mod request;
pub mod response;
pub mod saml11;

use std::io::Write;

use fedlink_core::ProcessingResult;
use fedlink_xml::XmlWriter;

use crate::time::format_timestamp;
use crate::types::{NameId, SamlObject};

/// Serializes any top-level SAML object to a document fragment.
pub fn to_xml_string(object: &SamlObject) -> ProcessingResult<String> {
    render(|writer| match object {
        SamlObject::Assertion(inner) => assertion::write_assertion(writer, inner, true),
        SamlObject::EncryptedAssertion(dom) => writer.write_dom(dom),
        SamlObject::AuthnRequest(inner) => request::write_authn_request(writer, inner),
        SamlObject::LogoutRequest(inner) => request::write_logout_request(writer, inner),
        SamlObject::LogoutResponse(inner) => response::write_logout_response(writer, inner),
        SamlObject::Response(inner) => response::write_response(writer, inner),
        SamlObject::XacmlAuthzQuery(inner) => request::write_xacml_query(writer, inner),
        SamlObject::ArtifactResolve(inner) => request::write_artifact_resolve(writer, inner),
        SamlObject::ArtifactResponse(inner) => response::write_artifact_response(writer, inner),
        SamlObject::AttributeQuery(inner) => request::write_attribute_query(writer, inner),
        SamlObject::EntityDescriptor(inner) => metadata::write_entity_descriptor(writer, inner, true),
        SamlObject::EntitiesDescriptor(inner) => {
            metadata::write_entities_descriptor(writer, inner, true)
        }
        SamlObject::Saml11Assertion(inner) => saml11::write_assertion(writer, inner, true),
        SamlObject::Saml11Response(inner) => saml11::write_response(writer, inner),
        SamlObject::Saml11Request(inner) => saml11::write_request(writer, inner),
    })
}

pub(crate) fn render<F>(body: F) -> ProcessingResult<String>
where
    F: FnOnce(&mut XmlWriter<Vec<u8>>) -> ProcessingResult<()>,
{
    let mut writer = XmlWriter::new(Vec::new());
    body(&mut writer)?;
    writer.into_string()
}

pub(crate) fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Writes a `NameID`-shaped element (attributes plus text value).
pub(crate) fn write_name_id<W: Write>(
    writer: &mut XmlWriter<W>,
    prefix: &str,
    local: &str,
    name_id: &NameId,
) -> ProcessingResult<()> {
    writer.start_element(Some(prefix), local)?;
    if let Some(format) = &name_id.format {
        writer.attribute("Format", format)?;
    }
    if let Some(qualifier) = &name_id.name_qualifier {
        writer.attribute("NameQualifier", qualifier)?;
    }
    if let Some(qualifier) = &name_id.sp_name_qualifier {
        writer.attribute("SPNameQualifier", qualifier)?;
    }
    if let Some(id) = &name_id.sp_provided_id {
        writer.attribute("SPProvidedID", id)?;
    }
    writer.text(&name_id.value)?;
    writer.end_element()
}

pub(crate) fn timestamp_attr<W: Write>(
    writer: &mut XmlWriter<W>,
    name: &str,
    instant: &chrono::DateTime<chrono::Utc>,
) -> ProcessingResult<()> {
    writer.attribute(name, &format_timestamp(instant))
}
