// Fee Agreement Signing - Core
//
// Sends fee agreements for e-signature through DocuSign or HelloSign,
// verifies provider callbacks and fans out notifications and follow-up
// work when an agreement changes status.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
