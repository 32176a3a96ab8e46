use super::schema::field_schema;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_CURRENCY: &str = "UAH";

/// One product entry of an order.
///
/// Prices are read from their text so the scale written by the merchant
/// (`10.0`, `1000`) is the scale that gets signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(alias = "count")]
    pub quantity: u32,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: Decimal, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }
}

field_schema! {
    /// Optional purchase fields that are rendered into the form but never
    /// signed.
    pub enum DescriptiveField {
        OrderNo => "orderNo",
        MerchantAuthType => "merchantAuthType",
        MerchantTransactionType => "merchantTransactionType",
        MerchantTransactionSecureType => "merchantTransactionSecureType",
        Language => "language",
        AlternativeAmount => "alternativeAmount",
        AlternativeCurrency => "alternativeCurrency",
        HoldTimeout => "holdTimeout",
        OrderTimeout => "orderTimeout",
        OrderLifetime => "orderLifetime",
        RecToken => "recToken",
        PaymentSystems => "paymentSystems",
        DefaultPaymentSystem => "defaultPaymentSystem",
        ClientAccountId => "clientAccountId",
        SocialUri => "socialUri",
        DeliveryList => "deliveryList",
        ClientFirstName => "clientFirstName",
        ClientLastName => "clientLastName",
        ClientAddress => "clientAddress",
        ClientCity => "clientCity",
        ClientState => "clientState",
        ClientZipCode => "clientZipCode",
        ClientCountry => "clientCountry",
        ClientEmail => "clientEmail",
        ClientPhone => "clientPhone",
        DeliveryFirstName => "deliveryFirstName",
        DeliveryLastName => "deliveryLastName",
        DeliveryAddress => "deliveryAddress",
        DeliveryCity => "deliveryCity",
        DeliveryState => "deliveryState",
        DeliveryZipCode => "deliveryZipCode",
        DeliveryCountry => "deliveryCountry",
        DeliveryEmail => "deliveryEmail",
        DeliveryPhone => "deliveryPhone",
        AviaDepartureDate => "aviaDepartureDate",
        AviaLocationNumber => "aviaLocationNumber",
        AviaLocationCodes => "aviaLocationCodes",
        AviaFirstName => "aviaFirstName",
        AviaLastName => "aviaLastName",
        AviaReservationCode => "aviaReservationCode",
    }
}

impl<'de> Deserialize<'de> for DescriptiveField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown order field `{name}`")))
    }
}

/// The merchant's side of a purchase: what is being bought and where the
/// gateway should send the customer and the callback afterwards.
///
/// `date` and `amount` may be left unset; the purchase request fills them in
/// when it is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderReference")]
    pub reference: String,
    #[serde(rename = "orderDate", default)]
    pub date: Option<i64>,
    #[serde(default, deserialize_with = "rust_decimal::serde::str_option::deserialize")]
    pub amount: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(rename = "merchantDomainName", default)]
    pub domain_name: String,
    #[serde(default)]
    pub return_url: Option<String>,
    #[serde(default)]
    pub service_url: Option<String>,
    #[serde(rename = "products", default)]
    pub line_items: Vec<LineItem>,
    #[serde(flatten)]
    pub details: BTreeMap<DescriptiveField, String>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for Order {
    fn default() -> Self {
        Self {
            reference: String::new(),
            date: None,
            amount: None,
            currency: default_currency(),
            domain_name: String::new(),
            return_url: None,
            service_url: None,
            line_items: Vec::new(),
            details: BTreeMap::new(),
        }
    }
}

impl Order {
    pub fn new(reference: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            domain_name: domain_name.into(),
            ..Self::default()
        }
    }

    /// Appends a line item. Call order is the order used for signing and
    /// rendering.
    pub fn add_line_item(&mut self, name: impl Into<String>, price: Decimal, quantity: u32) {
        self.line_items.push(LineItem::new(name, price, quantity));
    }

    pub fn set_detail(&mut self, field: DescriptiveField, value: impl Into<String>) {
        self.details.insert(field, value.into());
    }

    pub fn detail(&self, field: DescriptiveField) -> Option<&str> {
        self.details.get(&field).map(String::as_str)
    }

    /// Sum of the line items' unit prices.
    pub fn line_item_total(&self) -> Decimal {
        self.line_items.iter().map(|item| item.price).sum()
    }

    /// Fills `date` with `now` and `amount` with the line item total when
    /// they are unset. Values already present are kept.
    pub fn apply_defaults(&mut self, now: i64) {
        if self.date.is_none() {
            self.date = Some(now);
        }
        if self.amount.is_none() {
            self.amount = Some(self.line_item_total());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_fill_date_and_amount() {
        let mut order = Order::new("55", "www.market.ua");
        order.add_line_item("CPU", dec!(1000), 1);
        order.add_line_item("RAM", dec!(10.5), 3);

        order.apply_defaults(1415379863);

        assert_eq!(order.date, Some(1415379863));
        assert_eq!(order.amount, Some(dec!(1010.5)));
        assert_eq!(order.currency, "UAH");
    }

    #[test]
    fn test_defaults_keep_explicit_values() {
        let mut order = Order::new("55", "www.market.ua");
        order.date = Some(1);
        order.amount = Some(dec!(1547.36));
        order.add_line_item("CPU", dec!(1000), 1);

        order.apply_defaults(1415379863);

        assert_eq!(order.date, Some(1));
        assert_eq!(order.amount, Some(dec!(1547.36)));
    }

    #[test]
    fn test_deserialize_order_file() {
        let json = r#"{
            "orderReference": "DH783023",
            "orderDate": 1415379863,
            "amount": "1547.36",
            "merchantDomainName": "www.market.ua",
            "returnUrl": "https://www.market.ua/thanks",
            "clientFirstName": "Taras",
            "products": [
                {"name": "CPU", "price": "1000", "count": 1},
                {"name": "RAM", "price": "547.36", "quantity": 1}
            ]
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.reference, "DH783023");
        assert_eq!(order.date, Some(1415379863));
        assert_eq!(order.amount, Some(dec!(1547.36)));
        assert_eq!(order.currency, "UAH");
        assert_eq!(order.return_url.as_deref(), Some("https://www.market.ua/thanks"));
        assert_eq!(order.detail(DescriptiveField::ClientFirstName), Some("Taras"));
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[1], LineItem::new("RAM", dec!(547.36), 1));
    }

    #[test]
    fn test_deserialize_keeps_decimal_scale() {
        let json = r#"{
            "orderReference": "55",
            "amount": "20.50",
            "products": [{"name": "Widget", "price": "10.0", "quantity": 1}]
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.amount.map(|amount| amount.to_string()).as_deref(), Some("20.50"));
        assert_eq!(order.line_items[0].price.to_string(), "10.0");
    }

    #[test]
    fn test_deserialize_rejects_numeric_price() {
        let json = r#"{"orderReference": "55", "products": [{"name": "Widget", "price": 10.0, "quantity": 1}]}"#;
        assert!(serde_json::from_str::<Order>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_field() {
        let json = r#"{"orderReference": "1", "merchantSecretKey": "leak"}"#;
        assert!(serde_json::from_str::<Order>(json).is_err());
    }

    #[test]
    fn test_descriptive_field_names_round_trip() {
        for field in DescriptiveField::ALL {
            assert_eq!(DescriptiveField::from_name(field.name()), Some(*field));
        }
    }
}
