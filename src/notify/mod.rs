pub mod email;

pub use email::{compose_lead_email, format_thousands, BuyerContact, LeadEmail};
