//! Sewna: designer and client onboarding.
//!
//! Intake wizards, the submission gateway that hands their records to the
//! REST layer, the designer profile editor and OAuth account linking.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod intake;
pub mod oauth;
pub mod profile;
pub mod store;
pub mod wizard;
