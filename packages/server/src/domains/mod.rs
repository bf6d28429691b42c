// Business domains
pub mod fee_agreements;
