//! Web3 memory bot: remembers what users tell it, recalls it on request,
//! and answers token questions from public block explorers.

pub mod ai;
pub mod blockchain;
pub mod channels;
pub mod config;
pub mod db;
pub mod http;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_utils;
