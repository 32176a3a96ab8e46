use super::credentials::MerchantCredentials;
use super::fields::FieldMap;
use super::order::Order;
use super::ports::Clock;
use super::schema::field_schema;
use super::signature::{self, EmptyField, Signable};
use crate::error::Result;
use rust_decimal::Decimal;
use std::borrow::Cow;

field_schema! {
    /// Fields of a purchase request that carry protocol meaning.
    pub enum RequestField {
        MerchantAccount => "merchantAccount",
        MerchantDomainName => "merchantDomainName",
        OrderReference => "orderReference",
        OrderDate => "orderDate",
        Amount => "amount",
        Currency => "currency",
        ReturnUrl => "returnUrl",
        ServiceUrl => "serviceUrl",
        ProductName => "productName[]",
        ProductPrice => "productPrice[]",
        ProductCount => "productCount[]",
        MerchantSignature => "merchantSignature",
    }
}

/// Canonical signing order for purchase requests.
pub const REQUEST_SIGNATURE_FIELDS: [RequestField; 9] = [
    RequestField::MerchantAccount,
    RequestField::MerchantDomainName,
    RequestField::OrderReference,
    RequestField::OrderDate,
    RequestField::Amount,
    RequestField::Currency,
    RequestField::ProductName,
    RequestField::ProductCount,
    RequestField::ProductPrice,
];

/// Scalar fields emitted ahead of the descriptive fields.
const LEADING_FIELDS: [RequestField; 6] = [
    RequestField::MerchantAccount,
    RequestField::MerchantDomainName,
    RequestField::OrderReference,
    RequestField::OrderDate,
    RequestField::Amount,
    RequestField::Currency,
];

/// Scalar fields emitted after the descriptive fields, then the arrays.
const TRAILING_FIELDS: [RequestField; 5] = [
    RequestField::ReturnUrl,
    RequestField::ServiceUrl,
    RequestField::ProductName,
    RequestField::ProductPrice,
    RequestField::ProductCount,
];

/// A purchase ready to be signed for one merchant.
///
/// `build` fills in defaults, signs the canonical fields and produces the
/// hidden form fields for the gateway's payment page.
#[derive(Debug, Clone)]
pub struct PurchaseRequest<'a> {
    credentials: &'a MerchantCredentials,
    order: Order,
}

impl<'a> PurchaseRequest<'a> {
    pub fn new(credentials: &'a MerchantCredentials, order: Order) -> Self {
        Self { credentials, order }
    }

    /// Appends a line item; see [`Order::add_line_item`].
    pub fn add_line_item(
        &mut self,
        name: impl Into<String>,
        price: Decimal,
        quantity: u32,
    ) -> &mut Self {
        self.order.add_line_item(name, price, quantity);
        self
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn into_order(self) -> Order {
        self.order
    }

    /// Signs the request and returns the form fields.
    ///
    /// Fails with `MissingRequiredField` if any signed field is still empty
    /// after defaults are applied. The secret key never appears in the output.
    pub fn build(&mut self, clock: &impl Clock) -> Result<FieldMap> {
        self.order.apply_defaults(clock.now());

        let signature = signature::sign_fields(
            &*self,
            &REQUEST_SIGNATURE_FIELDS,
            EmptyField::Reject,
            &self.credentials.secret_key,
        )?;

        let mut fields = FieldMap::new();
        self.push_fields(&mut fields, &LEADING_FIELDS);
        for (field, value) in &self.order.details {
            if !value.is_empty() {
                fields.push(field.name(), value.as_str());
            }
        }
        self.push_fields(&mut fields, &TRAILING_FIELDS);
        fields.push(RequestField::MerchantSignature.name(), signature);

        tracing::debug!(
            order_reference = %self.order.reference,
            line_items = self.order.line_items.len(),
            fields = fields.len(),
            "purchase request signed"
        );
        Ok(fields)
    }

    fn push_fields(&self, fields: &mut FieldMap, list: &[RequestField]) {
        for &field in list {
            for value in self.field_values(field) {
                if !value.is_empty() {
                    fields.push(field.name(), value);
                }
            }
        }
    }
}

impl Signable<RequestField> for PurchaseRequest<'_> {
    fn field_values(&self, field: RequestField) -> Vec<Cow<'_, str>> {
        let order = &self.order;
        match field {
            RequestField::MerchantAccount => {
                vec![Cow::Borrowed(self.credentials.account.as_str())]
            }
            RequestField::MerchantDomainName => vec![Cow::Borrowed(order.domain_name.as_str())],
            RequestField::OrderReference => vec![Cow::Borrowed(order.reference.as_str())],
            RequestField::OrderDate => order
                .date
                .map(|date| Cow::Owned(date.to_string()))
                .into_iter()
                .collect(),
            RequestField::Amount => order
                .amount
                .map(|amount| Cow::Owned(amount.to_string()))
                .into_iter()
                .collect(),
            RequestField::Currency => vec![Cow::Borrowed(order.currency.as_str())],
            RequestField::ReturnUrl => order
                .return_url
                .as_deref()
                .map(Cow::Borrowed)
                .into_iter()
                .collect(),
            RequestField::ServiceUrl => order
                .service_url
                .as_deref()
                .map(Cow::Borrowed)
                .into_iter()
                .collect(),
            RequestField::ProductName => order
                .line_items
                .iter()
                .map(|item| Cow::Borrowed(item.name.as_str()))
                .collect(),
            RequestField::ProductPrice => order
                .line_items
                .iter()
                .map(|item| Cow::Owned(item.price.to_string()))
                .collect(),
            RequestField::ProductCount => order
                .line_items
                .iter()
                .map(|item| Cow::Owned(item.quantity.to_string()))
                .collect(),
            RequestField::MerchantSignature => Vec::new(),
        }
    }
}
