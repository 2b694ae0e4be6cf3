//! Shared helpers for the element parsers.

use fedlink_core::{ParsingError, ParsingResult};
use fedlink_xml::{StartTag, XmlCursor, XmlToken};

use crate::time::parse_timestamp;
use crate::types::{Attribute, NameId};

/// Builds the fail-closed error for an unrecognized child element.
pub(crate) fn unknown_element(tag: &StartTag) -> ParsingError {
    ParsingError::UnknownStartElement {
        name: tag.qualified_name(),
        offset: tag.offset,
    }
}

/// Checks the `Version` attribute against the protocol family.
pub(crate) fn require_version(tag: &StartTag, expected: &str) -> ParsingResult<()> {
    let actual = tag.required_attribute("Version")?;
    if actual == expected {
        Ok(())
    } else {
        Err(ParsingError::UnsupportedVersion {
            expected: expected.to_string(),
            actual,
        })
    }
}

pub(crate) fn parse_bool(field: &str, value: &str) -> ParsingResult<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ParsingError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

pub(crate) fn parse_u16(field: &str, value: &str) -> ParsingResult<u16> {
    value.parse().map_err(|_| ParsingError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

pub(crate) fn parse_u32(field: &str, value: &str) -> ParsingResult<u32> {
    value.parse().map_err(|_| ParsingError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Parses a `NameID`-shaped element (`NameID` or `Issuer`): attributes
/// plus text content, consuming through the end tag.
pub(crate) fn parse_name_id(cursor: &mut XmlCursor<'_>, local: &str) -> ParsingResult<NameId> {
    let tag = cursor.next_start_element()?;
    tag.expect_name(local)?;
    let format = tag.attribute("Format").map(str::to_string);
    let name_qualifier = tag.attribute("NameQualifier").map(str::to_string);
    let sp_name_qualifier = tag.attribute("SPNameQualifier").map(str::to_string);
    let sp_provided_id = tag.attribute("SPProvidedID").map(str::to_string);
    let value = cursor.element_text()?;
    Ok(NameId {
        value,
        format,
        name_qualifier,
        sp_name_qualifier,
        sp_provided_id,
    })
}

/// Parses a `saml:Attribute` element with its `AttributeValue` children.
pub(crate) fn parse_attribute(cursor: &mut XmlCursor<'_>) -> ParsingResult<Attribute> {
    let tag = cursor.next_start_element()?;
    tag.expect_name("Attribute")?;
    let mut attribute = Attribute {
        name: tag.required_attribute("Name")?,
        name_format: tag.attribute("NameFormat").map(str::to_string),
        friendly_name: tag.attribute("FriendlyName").map(str::to_string),
        values: Vec::new(),
    };
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Attribute")?;
            break;
        };
        if child.name.local_name == "AttributeValue" {
            cursor.next_start_element()?;
            attribute.values.push(element_text_or_empty(cursor)?);
        } else {
            return Err(unknown_element(&child));
        }
    }
    Ok(attribute)
}

/// Like `element_text`, but tolerates an empty element (an attribute value
/// may legitimately be the empty string).
pub(crate) fn element_text_or_empty(cursor: &mut XmlCursor<'_>) -> ParsingResult<String> {
    if matches!(cursor.peek()?, XmlToken::End(_)) {
        cursor.next_end_element()?;
        return Ok(String::new());
    }
    cursor.element_text()
}

/// Reads a required timestamp attribute.
pub(crate) fn required_timestamp(
    tag: &StartTag,
    attribute: &str,
) -> ParsingResult<chrono::DateTime<chrono::Utc>> {
    parse_timestamp(attribute, &tag.required_attribute(attribute)?)
}

/// Reads an optional timestamp attribute.
pub(crate) fn optional_timestamp(
    tag: &StartTag,
    attribute: &str,
) -> ParsingResult<Option<chrono::DateTime<chrono::Utc>>> {
    tag.attribute(attribute)
        .map(|v| parse_timestamp(attribute, v))
        .transpose()
}
