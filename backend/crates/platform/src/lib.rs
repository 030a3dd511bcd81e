//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, Base64, random material)
//! - Bearer credential and client-IP extraction
//! - Google ID-token verification capability (live + mock)
//! - MFA notification delivery (stubs)

pub mod client;
pub mod crypto;
pub mod google;
pub mod notify;
