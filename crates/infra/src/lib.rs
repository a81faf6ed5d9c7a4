//! Infrastructure layer: collaborator ports, the in-memory ledger store,
//! voucher/statement orchestration and configuration.

pub mod config;
pub mod error;
pub mod memory;
pub mod ports;
pub mod session;
pub mod statement_service;

mod integration_tests;

pub use config::AppConfig;
pub use error::CollaboratorError;
pub use memory::InMemoryLedgerStore;
pub use ports::{AccountDirectorySource, LedgerQuery, VoucherNumberSource, VoucherReceipt, VoucherSink};
pub use session::{SubmitError, VoucherSession};
pub use statement_service::StatementService;
