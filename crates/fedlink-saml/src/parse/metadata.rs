//! Parsers for SAML 2.0 metadata documents.

use fedlink_core::ParsingResult;
use fedlink_xml::{StartTag, XmlCursor};

use super::util;
use crate::types::constants::DSIG_NS;
use crate::types::{
    EntitiesDescriptor, EntityDescriptor, Endpoint, IdpSsoDescriptor, IndexedEndpoint,
    MetadataItem, RoleDescriptor, SpSsoDescriptor,
};

// Role elements other than the IdP and SP SSO descriptors.
const OTHER_ROLES: &[&str] = &[
    "RoleDescriptor",
    "AuthnAuthorityDescriptor",
    "AttributeAuthorityDescriptor",
    "PDPDescriptor",
];

// Entity-level children preserved without deep parsing.
const OPAQUE_ENTITY_CHILDREN: &[&str] =
    &["Organization", "ContactPerson", "AdditionalMetadataLocation", "Extensions"];

/// Parses an `md:EntitiesDescriptor`, recursing into nested groups.
pub fn parse_entities_descriptor(cursor: &mut XmlCursor<'_>) -> ParsingResult<EntitiesDescriptor> {
    let root = cursor.next_start_element()?;
    root.expect_name("EntitiesDescriptor")?;

    let mut group = EntitiesDescriptor {
        name: root.attribute("Name").map(str::to_string),
        id: root.attribute("ID").map(str::to_string),
        items: Vec::new(),
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("EntitiesDescriptor")?;
            break;
        };
        match child.name.local_name.as_str() {
            "EntityDescriptor" => group
                .items
                .push(MetadataItem::Entity(parse_entity_descriptor(cursor)?)),
            "EntitiesDescriptor" => group
                .items
                .push(MetadataItem::Entities(parse_entities_descriptor(cursor)?)),
            "Signature" if child.name.namespace_uri == DSIG_NS => {
                cursor.bypass_element_block("Signature")?;
            }
            "Extensions" => {
                cursor.bypass_element_block("Extensions")?;
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(group)
}

/// Parses an `md:EntityDescriptor` with its role descriptors.
pub fn parse_entity_descriptor(cursor: &mut XmlCursor<'_>) -> ParsingResult<EntityDescriptor> {
    let root = cursor.next_start_element()?;
    root.expect_name("EntityDescriptor")?;

    let mut entity = EntityDescriptor {
        entity_id: root.required_attribute("entityID")?,
        id: root.attribute("ID").map(str::to_string),
        roles: Vec::new(),
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("EntityDescriptor")?;
            break;
        };
        let local = child.name.local_name.as_str();
        if local == "IDPSSODescriptor" {
            entity.roles.push(RoleDescriptor::Idp(parse_idp_descriptor(cursor)?));
        } else if local == "SPSSODescriptor" {
            entity.roles.push(RoleDescriptor::Sp(parse_sp_descriptor(cursor)?));
        } else if OTHER_ROLES.contains(&local) {
            entity.roles.push(RoleDescriptor::Other(cursor.dom_element()?));
        } else if local == "Signature" && child.name.namespace_uri == DSIG_NS {
            cursor.bypass_element_block("Signature")?;
        } else if OPAQUE_ENTITY_CHILDREN.contains(&local) {
            let name = local.to_string();
            cursor.bypass_element_block(&name)?;
        } else {
            return Err(util::unknown_element(&child));
        }
    }
    Ok(entity)
}

fn parse_idp_descriptor(cursor: &mut XmlCursor<'_>) -> ParsingResult<IdpSsoDescriptor> {
    let root = cursor.next_start_element()?;
    root.expect_name("IDPSSODescriptor")?;

    let mut descriptor = IdpSsoDescriptor {
        protocol_support_enumeration: root
            .attribute("protocolSupportEnumeration")
            .map(str::to_string),
        want_authn_requests_signed: root
            .attribute("WantAuthnRequestsSigned")
            .map(|v| util::parse_bool("WantAuthnRequestsSigned", v))
            .transpose()?,
        ..IdpSsoDescriptor::default()
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("IDPSSODescriptor")?;
            break;
        };
        match child.name.local_name.as_str() {
            "KeyDescriptor" => descriptor.key_descriptors.push(cursor.dom_element()?),
            "SingleSignOnService" => {
                descriptor
                    .single_sign_on_services
                    .push(parse_endpoint(cursor, "SingleSignOnService")?);
            }
            "SingleLogoutService" => {
                descriptor
                    .single_logout_services
                    .push(parse_endpoint(cursor, "SingleLogoutService")?);
            }
            "NameIDFormat" => {
                cursor.next_start_element()?;
                descriptor.name_id_formats.push(cursor.element_text()?);
            }
            "Extensions" | "Attribute" | "Organization" | "ContactPerson"
            | "ArtifactResolutionService" | "ManageNameIDService" | "NameIDMappingService"
            | "AssertionIDRequestService" | "AttributeProfile" => {
                let name = child.name.local_name.clone();
                cursor.bypass_element_block(&name)?;
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(descriptor)
}

fn parse_sp_descriptor(cursor: &mut XmlCursor<'_>) -> ParsingResult<SpSsoDescriptor> {
    let root = cursor.next_start_element()?;
    root.expect_name("SPSSODescriptor")?;

    let mut descriptor = SpSsoDescriptor {
        protocol_support_enumeration: root
            .attribute("protocolSupportEnumeration")
            .map(str::to_string),
        authn_requests_signed: root
            .attribute("AuthnRequestsSigned")
            .map(|v| util::parse_bool("AuthnRequestsSigned", v))
            .transpose()?,
        want_assertions_signed: root
            .attribute("WantAssertionsSigned")
            .map(|v| util::parse_bool("WantAssertionsSigned", v))
            .transpose()?,
        ..SpSsoDescriptor::default()
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("SPSSODescriptor")?;
            break;
        };
        match child.name.local_name.as_str() {
            "KeyDescriptor" => descriptor.key_descriptors.push(cursor.dom_element()?),
            "SingleLogoutService" => {
                descriptor
                    .single_logout_services
                    .push(parse_endpoint(cursor, "SingleLogoutService")?);
            }
            "AssertionConsumerService" => {
                descriptor
                    .assertion_consumer_services
                    .push(parse_indexed_endpoint(cursor, "AssertionConsumerService")?);
            }
            "NameIDFormat" => {
                cursor.next_start_element()?;
                descriptor.name_id_formats.push(cursor.element_text()?);
            }
            "Extensions" | "Organization" | "ContactPerson" | "ArtifactResolutionService"
            | "ManageNameIDService" | "AttributeConsumingService" => {
                let name = child.name.local_name.clone();
                cursor.bypass_element_block(&name)?;
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(descriptor)
}

fn endpoint_from_tag(tag: &StartTag) -> ParsingResult<Endpoint> {
    Ok(Endpoint {
        binding: tag.required_attribute("Binding")?,
        location: tag.required_attribute("Location")?,
        response_location: tag.attribute("ResponseLocation").map(str::to_string),
    })
}

fn parse_endpoint(cursor: &mut XmlCursor<'_>, local: &str) -> ParsingResult<Endpoint> {
    let tag = cursor.next_start_element()?;
    tag.expect_name(local)?;
    let endpoint = endpoint_from_tag(&tag)?;
    cursor.next_end_element()?.expect_name(local)?;
    Ok(endpoint)
}

fn parse_indexed_endpoint(cursor: &mut XmlCursor<'_>, local: &str) -> ParsingResult<IndexedEndpoint> {
    let tag = cursor.next_start_element()?;
    tag.expect_name(local)?;
    let indexed = IndexedEndpoint {
        endpoint: endpoint_from_tag(&tag)?,
        index: util::parse_u16("index", &tag.required_attribute("index")?)?,
        is_default: tag
            .attribute("isDefault")
            .map(|v| util::parse_bool("isDefault", v))
            .transpose()?,
    };
    cursor.next_end_element()?.expect_name(local)?;
    Ok(indexed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDP_METADATA: &str = r#"<md:EntityDescriptor
        xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="http://idp">
        <md:IDPSSODescriptor WantAuthnRequestsSigned="true"
            protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
            <md:KeyDescriptor use="signing">
                <ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
                    <ds:KeyName>idp-signing</ds:KeyName>
                </ds:KeyInfo>
            </md:KeyDescriptor>
            <md:NameIDFormat>urn:oasis:names:tc:SAML:2.0:nameid-format:persistent</md:NameIDFormat>
            <md:SingleSignOnService
                Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect"
                Location="http://idp/sso"/>
            <md:SingleLogoutService
                Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST"
                Location="http://idp/slo" ResponseLocation="http://idp/slo-response"/>
        </md:IDPSSODescriptor>
    </md:EntityDescriptor>"#;

    #[test]
    fn idp_entity_descriptor_parses() {
        let entity = parse_entity_descriptor(&mut XmlCursor::new(IDP_METADATA)).unwrap();
        assert_eq!(entity.entity_id, "http://idp");
        let RoleDescriptor::Idp(idp) = &entity.roles[0] else {
            panic!("expected an IdP role");
        };
        assert_eq!(idp.want_authn_requests_signed, Some(true));
        assert_eq!(idp.key_descriptors.len(), 1);
        assert_eq!(idp.key_descriptors[0].name.local_name, "KeyDescriptor");
        assert_eq!(idp.single_sign_on_services[0].location, "http://idp/sso");
        assert_eq!(
            idp.single_logout_services[0].response_location.as_deref(),
            Some("http://idp/slo-response")
        );
        assert_eq!(
            idp.name_id_formats[0],
            "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent"
        );
    }

    #[test]
    fn sp_descriptor_with_indexed_endpoints() {
        let doc = r#"<md:EntityDescriptor
            xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="http://sp">
            <md:SPSSODescriptor AuthnRequestsSigned="true" WantAssertionsSigned="false">
                <md:AssertionConsumerService index="0" isDefault="true"
                    Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST"
                    Location="http://sp/acs"/>
                <md:AssertionConsumerService index="1"
                    Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact"
                    Location="http://sp/acs-artifact"/>
            </md:SPSSODescriptor>
        </md:EntityDescriptor>"#;
        let entity = parse_entity_descriptor(&mut XmlCursor::new(doc)).unwrap();
        let RoleDescriptor::Sp(sp) = &entity.roles[0] else {
            panic!("expected an SP role");
        };
        assert_eq!(sp.authn_requests_signed, Some(true));
        assert_eq!(sp.want_assertions_signed, Some(false));
        assert_eq!(sp.assertion_consumer_services.len(), 2);
        assert_eq!(sp.assertion_consumer_services[0].is_default, Some(true));
        assert_eq!(sp.assertion_consumer_services[1].index, 1);
    }

    #[test]
    fn entities_descriptor_nests() {
        let doc = format!(
            r#"<md:EntitiesDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" Name="federation">
                <md:EntitiesDescriptor Name="inner">{IDP_METADATA}</md:EntitiesDescriptor>
            </md:EntitiesDescriptor>"#
        );
        let group = parse_entities_descriptor(&mut XmlCursor::new(&doc)).unwrap();
        assert_eq!(group.name.as_deref(), Some("federation"));
        let MetadataItem::Entities(inner) = &group.items[0] else {
            panic!("expected a nested group");
        };
        assert_eq!(inner.name.as_deref(), Some("inner"));
        assert!(matches!(inner.items[0], MetadataItem::Entity(_)));
    }

    #[test]
    fn unknown_role_is_preserved_opaquely() {
        let doc = r#"<md:EntityDescriptor
            xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="http://aa">
            <md:AttributeAuthorityDescriptor
                protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
                <md:AttributeService
                    Binding="urn:oasis:names:tc:SAML:2.0:bindings:SOAP"
                    Location="http://aa/attr"/>
            </md:AttributeAuthorityDescriptor>
        </md:EntityDescriptor>"#;
        let entity = parse_entity_descriptor(&mut XmlCursor::new(doc)).unwrap();
        let RoleDescriptor::Other(dom) = &entity.roles[0] else {
            panic!("expected an opaque role");
        };
        assert_eq!(dom.name.local_name, "AttributeAuthorityDescriptor");
    }
}
