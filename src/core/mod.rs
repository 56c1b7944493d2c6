pub mod ledger;
pub mod registration;
pub mod screening;

pub use ledger::Ledger;
pub use registration::RegistrationDesk;
pub use screening::Screening;
