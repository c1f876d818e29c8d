pub mod api;
pub mod app;
pub mod config;
pub mod controllers;
pub mod downloads;
pub mod export;
pub mod ui;
pub mod util;
pub mod views;

#[cfg(test)]
mod testing;
