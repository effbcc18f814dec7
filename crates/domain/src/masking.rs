//! Field-level PHI masking.
//!
//! All functions here are pure and total: malformed input degrades to a
//! best-effort partial mask or passthrough, never a panic. Masking applied
//! at audit-write time is irreversible; redacted characters are not stored
//! anywhere and cannot be reconstructed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::security::Role;

/// Marker substituted for an entire value under complete masking.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Policy controlling how much of a sensitive value is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskingLevel {
    /// Reveal a fixed suffix, redact the rest.
    Partial,
    /// Replace the entire value with the redaction marker.
    Complete,
}

impl MaskingLevel {
    /// Returns the masking level implied by a role.
    ///
    /// Privileged clinical roles see partial values; everyone else gets the
    /// most restrictive level.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin | Role::Clinician => Self::Partial,
            Role::Nurse | Role::Staff => Self::Complete,
        }
    }
}

/// Kind of sensitive field, resolved at the call site.
///
/// Unrecognized sensitive fields map to [`FieldKind::Other`], which masks the
/// whole value even at the partial level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Social security number.
    Ssn,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Medical record number.
    Mrn,
    /// Payment card number.
    CreditCard,
    /// Any other sensitive value.
    Other,
}

impl FieldKind {
    /// Classifies a detail-map key as a sensitive field kind.
    ///
    /// Returns `None` for keys that carry no PHI and must pass through
    /// unmasked.
    #[must_use]
    pub fn classify(key: &str) -> Option<Self> {
        match key {
            "ssn" => Some(Self::Ssn),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "mrn" => Some(Self::Mrn),
            "creditCard" => Some(Self::CreditCard),
            "patientId" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Masks all but the last `visible_suffix` characters of a value.
///
/// Values at or under the visible length are returned unchanged; this is
/// intentional, short values carry too little signal to partially redact.
/// Total character length is always preserved. Operates on characters, not
/// bytes, so multi-byte input never splits.
#[must_use]
pub fn mask_field(value: &str, visible_suffix: usize, mask_char: char) -> String {
    let char_count = value.chars().count();
    if char_count <= visible_suffix {
        return value.to_owned();
    }

    let masked_len = char_count - visible_suffix;
    let mut masked = mask_char.to_string().repeat(masked_len);
    masked.extend(value.chars().skip(masked_len));
    masked
}

/// Masks a social security number.
///
/// Partial mode normalizes separators and reveals the last four digits as
/// `***-**-NNNN`; anything that does not normalize to nine digits is fully
/// masked at original length. Complete mode returns the redaction marker.
/// Empty input stays empty.
#[must_use]
pub fn mask_ssn(value: &str, level: MaskingLevel) -> String {
    if value.is_empty() {
        return String::new();
    }
    if level == MaskingLevel::Complete {
        return REDACTION_MARKER.to_owned();
    }

    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 9 {
        format!("***-**-{}", &digits[digits.len() - 4..])
    } else {
        mask_field(value, 0, '*')
    }
}

/// Masks an email address.
///
/// Partial mode keeps the domain unchanged and reveals the last two
/// characters of the local part; input without an `@` falls back to masking
/// the whole value except its last two characters. Complete mode returns the
/// redaction marker. Empty input stays empty.
#[must_use]
pub fn mask_email(value: &str, level: MaskingLevel) -> String {
    if value.is_empty() {
        return String::new();
    }
    if level == MaskingLevel::Complete {
        return REDACTION_MARKER.to_owned();
    }

    match value.find('@') {
        Some(at_position) => {
            let local = &value[..at_position];
            let domain = &value[at_position + 1..];
            format!("{}@{domain}", mask_field(local, 2, '*'))
        }
        None => mask_field(value, 2, '*'),
    }
}

/// Masks a phone number.
///
/// Partial mode strips formatting and reveals the last four digits as
/// `***-***-NNNN`; input with fewer than four digits is fully masked at
/// original length. Complete mode returns the redaction marker. Empty input
/// stays empty.
#[must_use]
pub fn mask_phone(value: &str, level: MaskingLevel) -> String {
    if value.is_empty() {
        return String::new();
    }
    if level == MaskingLevel::Complete {
        return REDACTION_MARKER.to_owned();
    }

    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() >= 4 {
        format!("***-***-{}", &digits[digits.len() - 4..])
    } else {
        mask_field(value, 0, '*')
    }
}

/// Masks a single value according to its field kind and level.
#[must_use]
pub fn mask_value(value: &str, kind: FieldKind, level: MaskingLevel) -> String {
    if value.is_empty() {
        return String::new();
    }

    match kind {
        FieldKind::Ssn => mask_ssn(value, level),
        FieldKind::Email => mask_email(value, level),
        FieldKind::Phone => mask_phone(value, level),
        FieldKind::Mrn | FieldKind::CreditCard => match level {
            MaskingLevel::Partial => mask_field(value, 4, '*'),
            MaskingLevel::Complete => REDACTION_MARKER.to_owned(),
        },
        FieldKind::Other => match level {
            MaskingLevel::Partial => mask_field(value, 0, '*'),
            MaskingLevel::Complete => REDACTION_MARKER.to_owned(),
        },
    }
}

/// Shallow-copies an object, masking the listed string fields at the level
/// implied by the role.
///
/// Non-string and absent fields pass through unchanged.
#[must_use]
pub fn mask_object(
    source: &Map<String, Value>,
    fields: &[(&str, FieldKind)],
    role: Role,
) -> Map<String, Value> {
    let level = MaskingLevel::for_role(role);
    let mut masked = source.clone();

    for (name, kind) in fields {
        if let Some(Value::String(text)) = source.get(*name) {
            masked.insert((*name).to_owned(), Value::String(mask_value(text, *kind, level)));
        }
    }

    masked
}

/// Recursively masks known sensitive keys inside an audit detail map.
///
/// String values under recognized keys are masked; nested objects and arrays
/// are walked; everything else is copied verbatim.
#[must_use]
pub fn mask_details(details: &Map<String, Value>, level: MaskingLevel) -> Map<String, Value> {
    let mut masked = Map::new();
    for (key, value) in details {
        masked.insert(key.clone(), mask_detail_value(key, value, level));
    }

    masked
}

fn mask_detail_value(key: &str, value: &Value, level: MaskingLevel) -> Value {
    match value {
        Value::String(text) => match FieldKind::classify(key) {
            Some(kind) => Value::String(mask_value(text, kind, level)),
            None => value.clone(),
        },
        Value::Object(nested) => Value::Object(mask_details(nested, level)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| mask_detail_value(key, item, level))
                .collect(),
        ),
        _ => value.clone(),
    }
}
