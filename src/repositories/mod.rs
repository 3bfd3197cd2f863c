//! # Repository Layer
//!
//! Repositories encapsulate the SeaORM operations of the tender core. Writers
//! own their transactions; the authorization and version store repositories
//! borrow whatever connection or transaction the caller is working on.

pub mod authorization;
pub mod rollback;
pub mod tender;
pub mod tender_query;
pub mod tender_version;

pub use authorization::AuthorizationRepository;
pub use rollback::RollbackRepository;
pub use tender::{NewTender, TenderDeltas, TenderRepository};
pub use tender_query::{Page, TenderQueryRepository};
pub use tender_version::TenderVersionRepository;
