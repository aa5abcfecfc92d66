mod config;
mod governor;
mod payload;
