//! Test-send delivery for blockmail.
//!
//! The editor can send an exported email to a single address before a real
//! campaign goes out. [`HttpMailer`] talks to a Resend-compatible HTTP API;
//! anything implementing [`Mailer`] can stand in for it.

mod error;
mod mailer;

pub use error::DeliveryError;
pub use mailer::{DeliveryReceipt, HttpMailer, Mailer, OutgoingEmail};
