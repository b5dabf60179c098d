pub mod calculator;
pub mod common;
pub mod contact;
pub mod gallery;
pub mod handlers;
pub mod order;
pub mod states;
pub mod transport;

#[cfg(test)]
mod proptests;
