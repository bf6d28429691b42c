pub mod fee_agreement;
pub mod status;

pub use fee_agreement::{Company, EventLog, FeeAgreement, HiringAuthority, StaffMember};
pub use status::{FeeAgreementStatus, PaymentScheme, SignatureProvider, SignerRole};
