// Floor telemetry - Dashboard coordination core and telemetry API
pub mod application;
pub mod cli;
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
