//! Command line front end

pub mod admin;
pub mod calculate;
pub mod list;
pub mod seed;
pub mod setup;
pub mod ui;
