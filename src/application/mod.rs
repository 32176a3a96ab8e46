//! Merchant-facing facade: signs outgoing purchases and gates incoming
//! callbacks on their signature before they are trusted.

pub mod gateway;
