pub mod blockchain;
pub mod dashboard;
pub mod documents;
pub mod login;
pub mod media;
pub mod patents;
