pub mod amm;
pub mod coin;
pub mod config;
pub mod gateway;
pub mod rpc;
pub mod wallet;

pub use coin::{CoinClient, CoinError, CoinObjectRef, CoinOutcome};
pub use gateway::{ConnectionRegistry, Gateway};
