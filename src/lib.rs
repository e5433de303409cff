pub mod api;
pub mod config;
pub mod controller;
pub mod data_models;
pub mod document_client;
pub mod error;
pub mod pdf_exporter;
pub mod renderer;
pub mod sanitizer;
pub mod search_client;
pub mod view;
