//! Protocol types and rules: credentials, orders, the purchase request, the
//! payment callback and the signature that binds them.

pub mod acknowledgement;
pub mod credentials;
pub mod fields;
pub mod notification;
pub mod order;
pub mod ports;
pub mod purchase;
pub mod schema;
pub mod signature;
pub mod status;
