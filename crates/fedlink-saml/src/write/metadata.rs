//! Writers for SAML 2.0 metadata documents.

use std::io::Write;

use fedlink_core::ProcessingResult;
use fedlink_xml::XmlWriter;

use super::bool_str;
use crate::types::constants::{METADATA_NS, METADATA_PREFIX};
use crate::types::{
    EntitiesDescriptor, EntityDescriptor, Endpoint, IdpSsoDescriptor, IndexedEndpoint,
    MetadataItem, RoleDescriptor, SpSsoDescriptor,
};

/// Writes an `md:EntitiesDescriptor`, recursing into nested groups.
pub fn write_entities_descriptor<W: Write>(
    writer: &mut XmlWriter<W>,
    group: &EntitiesDescriptor,
    declare_ns: bool,
) -> ProcessingResult<()> {
    writer.start_element(Some(METADATA_PREFIX), "EntitiesDescriptor")?;
    if declare_ns {
        writer.ns_decl(METADATA_PREFIX, METADATA_NS)?;
    }
    if let Some(name) = &group.name {
        writer.attribute("Name", name)?;
    }
    if let Some(id) = &group.id {
        writer.attribute("ID", id)?;
    }
    for item in &group.items {
        match item {
            MetadataItem::Entity(entity) => write_entity_descriptor(writer, entity, false)?,
            MetadataItem::Entities(nested) => write_entities_descriptor(writer, nested, false)?,
        }
    }
    writer.end_element()
}

/// Writes an `md:EntityDescriptor` with its role descriptors.
pub fn write_entity_descriptor<W: Write>(
    writer: &mut XmlWriter<W>,
    entity: &EntityDescriptor,
    declare_ns: bool,
) -> ProcessingResult<()> {
    writer.start_element(Some(METADATA_PREFIX), "EntityDescriptor")?;
    if declare_ns {
        writer.ns_decl(METADATA_PREFIX, METADATA_NS)?;
    }
    writer.attribute("entityID", &entity.entity_id)?;
    if let Some(id) = &entity.id {
        writer.attribute("ID", id)?;
    }
    for role in &entity.roles {
        match role {
            RoleDescriptor::Idp(idp) => write_idp_descriptor(writer, idp)?,
            RoleDescriptor::Sp(sp) => write_sp_descriptor(writer, sp)?,
            RoleDescriptor::Other(dom) => writer.write_dom(dom)?,
        }
    }
    writer.end_element()
}

fn write_idp_descriptor<W: Write>(
    writer: &mut XmlWriter<W>,
    descriptor: &IdpSsoDescriptor,
) -> ProcessingResult<()> {
    writer.start_element(Some(METADATA_PREFIX), "IDPSSODescriptor")?;
    if let Some(value) = descriptor.want_authn_requests_signed {
        writer.attribute("WantAuthnRequestsSigned", bool_str(value))?;
    }
    if let Some(value) = &descriptor.protocol_support_enumeration {
        writer.attribute("protocolSupportEnumeration", value)?;
    }
    for key in &descriptor.key_descriptors {
        writer.write_dom(key)?;
    }
    for format in &descriptor.name_id_formats {
        writer.start_element(Some(METADATA_PREFIX), "NameIDFormat")?;
        writer.text(format)?;
        writer.end_element()?;
    }
    for endpoint in &descriptor.single_logout_services {
        write_endpoint(writer, "SingleLogoutService", endpoint)?;
    }
    for endpoint in &descriptor.single_sign_on_services {
        write_endpoint(writer, "SingleSignOnService", endpoint)?;
    }
    writer.end_element()
}

fn write_sp_descriptor<W: Write>(
    writer: &mut XmlWriter<W>,
    descriptor: &SpSsoDescriptor,
) -> ProcessingResult<()> {
    writer.start_element(Some(METADATA_PREFIX), "SPSSODescriptor")?;
    if let Some(value) = descriptor.authn_requests_signed {
        writer.attribute("AuthnRequestsSigned", bool_str(value))?;
    }
    if let Some(value) = descriptor.want_assertions_signed {
        writer.attribute("WantAssertionsSigned", bool_str(value))?;
    }
    if let Some(value) = &descriptor.protocol_support_enumeration {
        writer.attribute("protocolSupportEnumeration", value)?;
    }
    for key in &descriptor.key_descriptors {
        writer.write_dom(key)?;
    }
    for endpoint in &descriptor.single_logout_services {
        write_endpoint(writer, "SingleLogoutService", endpoint)?;
    }
    for format in &descriptor.name_id_formats {
        writer.start_element(Some(METADATA_PREFIX), "NameIDFormat")?;
        writer.text(format)?;
        writer.end_element()?;
    }
    for endpoint in &descriptor.assertion_consumer_services {
        write_indexed_endpoint(writer, "AssertionConsumerService", endpoint)?;
    }
    writer.end_element()
}

fn write_endpoint<W: Write>(
    writer: &mut XmlWriter<W>,
    local: &str,
    endpoint: &Endpoint,
) -> ProcessingResult<()> {
    writer.start_element(Some(METADATA_PREFIX), local)?;
    endpoint_attributes(writer, endpoint)?;
    writer.end_element()
}

fn write_indexed_endpoint<W: Write>(
    writer: &mut XmlWriter<W>,
    local: &str,
    indexed: &IndexedEndpoint,
) -> ProcessingResult<()> {
    writer.start_element(Some(METADATA_PREFIX), local)?;
    endpoint_attributes(writer, &indexed.endpoint)?;
    writer.attribute("index", &indexed.index.to_string())?;
    if let Some(value) = indexed.is_default {
        writer.attribute("isDefault", bool_str(value))?;
    }
    writer.end_element()
}

fn endpoint_attributes<W: Write>(
    writer: &mut XmlWriter<W>,
    endpoint: &Endpoint,
) -> ProcessingResult<()> {
    writer.attribute("Binding", &endpoint.binding)?;
    writer.attribute("Location", &endpoint.location)?;
    if let Some(value) = &endpoint.response_location {
        writer.attribute("ResponseLocation", value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::types::constants::bindings;
    use fedlink_xml::XmlCursor;

    #[test]
    fn idp_metadata_round_trips() {
        let entity = EntityDescriptor {
            entity_id: "http://idp".to_string(),
            id: None,
            roles: vec![RoleDescriptor::Idp(IdpSsoDescriptor {
                protocol_support_enumeration: Some(
                    "urn:oasis:names:tc:SAML:2.0:protocol".to_string(),
                ),
                want_authn_requests_signed: Some(true),
                single_sign_on_services: vec![Endpoint {
                    binding: bindings::HTTP_REDIRECT.to_string(),
                    location: "http://idp/sso".to_string(),
                    response_location: None,
                }],
                name_id_formats: vec![
                    "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent".to_string(),
                ],
                ..IdpSsoDescriptor::default()
            })],
        };
        let xml = super::super::render(|w| write_entity_descriptor(w, &entity, true)).unwrap();
        let parsed = parse::metadata::parse_entity_descriptor(&mut XmlCursor::new(&xml)).unwrap();
        assert_eq!(parsed, entity);
    }

    #[test]
    fn nested_entities_round_trip() {
        let group = EntitiesDescriptor {
            name: Some("federation".to_string()),
            id: None,
            items: vec![MetadataItem::Entities(EntitiesDescriptor {
                name: Some("inner".to_string()),
                id: None,
                items: vec![MetadataItem::Entity(EntityDescriptor {
                    entity_id: "http://sp".to_string(),
                    id: None,
                    roles: vec![RoleDescriptor::Sp(SpSsoDescriptor {
                        authn_requests_signed: Some(true),
                        assertion_consumer_services: vec![IndexedEndpoint {
                            endpoint: Endpoint {
                                binding: bindings::HTTP_POST.to_string(),
                                location: "http://sp/acs".to_string(),
                                response_location: None,
                            },
                            index: 0,
                            is_default: Some(true),
                        }],
                        ..SpSsoDescriptor::default()
                    })],
                })],
            })],
        };
        let xml = super::super::render(|w| write_entities_descriptor(w, &group, true)).unwrap();
        let parsed =
            parse::metadata::parse_entities_descriptor(&mut XmlCursor::new(&xml)).unwrap();
        assert_eq!(parsed, group);
    }
}
