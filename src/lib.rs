pub mod configuration;
pub mod domain;
pub mod newsletter_service;
pub mod repository;
pub mod routes;
pub mod selector;
pub mod startup;
pub mod telemetry;
mod utils;
pub mod validation;
