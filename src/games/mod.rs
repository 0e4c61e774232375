//! Game implementations.

pub mod janken;
