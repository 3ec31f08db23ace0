//! Wire types shared by the node, the event gateway and the client.

pub mod api;
pub mod events;
pub mod value;

pub use value::Value;
