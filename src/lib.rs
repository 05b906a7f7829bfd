pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod feed;
pub mod format;
pub mod storefront;
pub mod tmdb;

#[cfg(test)]
mod testing;
