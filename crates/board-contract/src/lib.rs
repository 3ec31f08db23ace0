//! Message board contract core.
//!
//! One message per principal, at most 280 code points, never empty.
//! Unset principals read back as the sentinel `"none"`. Mutations go
//! through the [`Executor`], which applies submitted calls one at a time
//! in submission order.

pub mod abi;
pub mod board;
pub mod error;
pub mod executor;
pub mod principal;
pub mod store;
pub mod text;

pub use abi::{CallError, ContractId, PublicCall, ReadOnlyCall};
pub use board::{MessageBoard, ReadOutcome, SENTINEL};
pub use error::{ErrorCode, Response};
pub use executor::{Executor, Receipt, TxEvent};
pub use principal::{Principal, PrincipalError};
pub use store::{MemoryStore, RecordStore};
pub use text::{MAX_MESSAGE_LEN, MessageText, TextError};
