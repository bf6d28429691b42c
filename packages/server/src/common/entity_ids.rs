//! Typed ids for every entity the fee-agreement core reads.

pub use super::id::Id;

pub struct FeeAgreement;
pub struct Company;
pub struct HiringAuthority;
/// Internal staff: coaches, creators, regional and production directors.
pub struct User;

pub type FeeAgreementId = Id<FeeAgreement>;
pub type CompanyId = Id<Company>;
pub type HiringAuthorityId = Id<HiringAuthority>;
pub type UserId = Id<User>;
