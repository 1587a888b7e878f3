//! Inkwell Reader - a personal RSS and read-it-later service
//!
//! The server fetches pages and feeds, extracts readable articles and keeps
//! sources and bookmarks in SQLite. The [`client`] module holds the view-state
//! controller that drives the API.

pub mod article;
pub mod client;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod feed;
pub mod models;
pub mod routes;
