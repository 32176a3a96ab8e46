//! Adapters between the outside world and the gateway: callback bodies,
//! line item files and the rendered payment form.

pub mod callback;
pub mod csv;
pub mod html;
