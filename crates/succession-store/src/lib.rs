//! Storage layer: contract gateways (memory, file), key index, record store.

mod error;
pub use error::StoreError;

pub mod file;
pub mod gateway;
pub mod index;
pub mod memory;
pub mod records;

pub use file::FileLedger;
pub use gateway::{ContractReader, ContractWriter, GatewayError, Receipt};
pub use index::KeyIndex;
pub use memory::{MemoryLedger, ReadOnlyLedger};
pub use records::RecordStore;
