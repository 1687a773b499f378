//! Decoders for typed leaf values.
//!
//! Amounts are written as unbounded decimal digit strings in the document;
//! they are range-checked here so that a value which does not fit in a signed
//! 64-bit quantity is reported instead of wrapping.

use std::str::FromStr;
use std::time::Duration;

use cachet_core::{ClusterUri, MemoryUnit, ResourceUnit, TimeUnit};

use crate::dom::Element;
use crate::error::{Result, XmlConfigError};

/// Why a decimal amount was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    /// Not an unsigned decimal integer.
    Invalid,
    /// Larger than `i64::MAX`.
    Overflow,
}

/// Parses an unsigned decimal amount of arbitrary length.
///
/// An optional leading `+` and leading zeros are accepted.
///
/// # Example
///
/// ```
/// use cachet_xml::values::{parse_amount, AmountError};
///
/// assert_eq!(parse_amount("0042"), Ok(42));
/// assert_eq!(parse_amount("99999999999999999999"), Err(AmountError::Overflow));
/// assert_eq!(parse_amount("12s"), Err(AmountError::Invalid));
/// ```
pub fn parse_amount(raw: &str) -> std::result::Result<u64, AmountError> {
    let raw = raw.trim();
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::Invalid);
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 19 {
        return Err(AmountError::Overflow);
    }
    if significant.is_empty() {
        return Ok(0);
    }
    match significant.parse::<u64>() {
        Ok(value) if value <= i64::MAX as u64 => Ok(value),
        _ => Err(AmountError::Overflow),
    }
}

/// Parses a boolean flag: `true` (any case) or `1`.
pub fn parse_flag(raw: &str) -> bool {
    let raw = raw.trim();
    raw.eq_ignore_ascii_case("true") || raw == "1"
}

/// Returns the tag of the element's parent, or `null` for a root.
pub(crate) fn parent_of(element: &Element) -> String {
    element.parent_tag().unwrap_or("null").to_string()
}

/// Decodes a timeout element into a [`Duration`].
///
/// The amount is read from the `value` attribute or from the text content;
/// giving both is rejected. The `unit` attribute defaults to seconds.
pub fn decode_timeout(element: &Element) -> Result<Duration> {
    let text = element.text();
    let raw = match element.attribute("value") {
        Some(value) if !text.trim().is_empty() => {
            return Err(XmlConfigError::invalid_value(
                element.tag_name(),
                value,
                format!("amount also given as text content '{}'", text.trim()),
            ));
        }
        Some(value) => value,
        None => text.as_str(),
    };
    let unit = decode_unit::<TimeUnit>(element, "unit", "seconds")?;

    let overflow =
        || XmlConfigError::duration_overflow(element.tag_name(), parent_of(element), raw.trim());
    let amount = parse_amount(raw).map_err(|e| match e {
        AmountError::Overflow => overflow(),
        AmountError::Invalid => XmlConfigError::invalid_value(
            element.tag_name(),
            raw.trim(),
            "expected a non-negative integer amount",
        ),
    })?;
    unit.to_duration(amount).ok_or_else(overflow)
}

/// Decodes a unit attribute, falling back to `default` when absent.
pub fn decode_unit<U>(element: &Element, attribute: &str, default: &str) -> Result<U>
where
    U: FromStr,
    U::Err: std::fmt::Display,
{
    let raw = element.attribute(attribute).unwrap_or(default);
    raw.parse::<U>()
        .map_err(|e| XmlConfigError::invalid_value(element.tag_name(), raw, e.to_string()))
}

/// Decodes the memory unit of `element`, defaulting to `default`.
pub fn decode_memory_unit(element: &Element, default: MemoryUnit) -> Result<MemoryUnit> {
    match element.attribute("unit") {
        Some(_) => decode_unit(element, "unit", ""),
        None => Ok(default),
    }
}

/// Decodes the resource unit of `element`, defaulting to `default`.
pub fn decode_resource_unit(element: &Element, default: ResourceUnit) -> Result<ResourceUnit> {
    match element.attribute("unit") {
        Some(_) => decode_unit(element, "unit", ""),
        None => Ok(default),
    }
}

/// Decodes the size held in the text content of `element`.
pub fn decode_size(element: &Element) -> Result<u64> {
    let text = element.text();
    parse_amount(&text).map_err(|e| {
        let message = match e {
            AmountError::Invalid => "expected a non-negative integer size",
            AmountError::Overflow => "size exceeds the allowed magnitude",
        };
        XmlConfigError::invalid_value(element.tag_name(), text.trim(), message)
    })
}

/// Decodes a required URI attribute, keeping the value as written.
pub fn decode_uri(element: &Element, attribute: &str) -> Result<ClusterUri> {
    let value = element
        .attribute(attribute)
        .ok_or_else(|| XmlConfigError::missing_attribute(attribute, element.tag_name()))?;
    ClusterUri::parse(value.trim()).map_err(|cause| XmlConfigError::MalformedUri {
        attribute: attribute.to_string(),
        element: element.tag_name(),
        parent: parent_of(element),
        value: value.to_string(),
        cause,
    })
}
