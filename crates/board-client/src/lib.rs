//! Client for a message board node.
//!
//! [`HttpWallet`] plays the part of a browser wallet: it holds the session
//! for one connected principal and signs public calls with it. The free
//! functions in [`board`] speak the board's four functions on top of any
//! [`WalletProvider`].

pub mod board;
pub mod error;
pub mod view;
pub mod wallet;

pub use board::{clear_message, get_message, get_my_message, set_message};
pub use error::ClientError;
pub use view::MessageView;
pub use wallet::{HttpWallet, WalletProvider};
