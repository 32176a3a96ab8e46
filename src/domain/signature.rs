//! Merchant signature computation shared by outbound requests and inbound
//! callbacks.
//!
//! A signature is the lowercase hex HMAC-MD5 of selected field values joined
//! with `;`. Which fields take part, and in what order, is fixed per message
//! kind by a canonical field list. Values are never sorted or taken from a
//! map's iteration order.

use super::credentials::SecretKey;
use crate::error::{GatewayError, Result};
use hmac::{Hmac, Mac};
use md5::Md5;
use std::borrow::Cow;
use subtle::ConstantTimeEq;

type HmacMd5 = Hmac<Md5>;

pub const SIGNATURE_DELIMITER: char = ';';

/// A field that can appear in a canonical signature list.
pub trait SignatureField: Copy {
    /// Wire name of the field, e.g. `orderReference` or `productName[]`.
    fn name(self) -> &'static str;
}

/// A message whose fields can be resolved by canonical field.
///
/// Scalar fields resolve to zero or one value. Array fields resolve to one
/// value per element, in element order.
pub trait Signable<F: SignatureField> {
    fn field_values(&self, field: F) -> Vec<Cow<'_, str>>;
}

/// What to do when a canonical field has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyField {
    /// Fail with `MissingRequiredField`. Used for outbound requests.
    Reject,
    /// Leave the field out of the signed string. Used for callbacks.
    Skip,
}

/// Resolves `fields` on `subject` in list order and flattens array values.
pub fn collect_values<'a, F, S>(
    subject: &'a S,
    fields: &[F],
    empty: EmptyField,
) -> Result<Vec<Cow<'a, str>>>
where
    F: SignatureField,
    S: Signable<F>,
{
    let mut values = Vec::new();
    for &field in fields {
        let resolved = subject.field_values(field);
        let has_gap = resolved.is_empty() || resolved.iter().any(|value| value.is_empty());

        if has_gap && empty == EmptyField::Reject {
            return Err(GatewayError::MissingRequiredField {
                field: field.name(),
            });
        }
        values.extend(resolved.into_iter().filter(|value| !value.is_empty()));
    }
    Ok(values)
}

/// Joins `values` with the protocol delimiter.
pub fn signing_string<I, V>(values: I) -> String
where
    I: IntoIterator<Item = V>,
    V: AsRef<str>,
{
    let mut joined = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            joined.push(SIGNATURE_DELIMITER);
        }
        joined.push_str(value.as_ref());
    }
    joined
}

/// Computes the merchant signature over an ordered list of values.
pub fn sign<I, V>(values: I, key: &SecretKey) -> String
where
    I: IntoIterator<Item = V>,
    V: AsRef<str>,
{
    let message = signing_string(values);
    let mut mac = HmacMd5::new_from_slice(key.expose()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Collects the canonical values of `subject` and signs them.
pub fn sign_fields<F, S>(
    subject: &S,
    fields: &[F],
    empty: EmptyField,
    key: &SecretKey,
) -> Result<String>
where
    F: SignatureField,
    S: Signable<F>,
{
    let values = collect_values(subject, fields, empty)?;
    tracing::debug!(values = values.len(), "computing merchant signature");
    Ok(sign(values, key))
}

/// Exact, case-sensitive comparison of two signatures in constant time.
pub fn signatures_match(expected: &str, received: &str) -> bool {
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}
