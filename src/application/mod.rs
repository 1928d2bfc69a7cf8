// Application layer - Use cases and the dashboard coordination core
pub mod coordination;
pub mod device_service;
pub mod feed;
pub mod feed_slot;
pub mod selection_store;
pub mod telemetry_repository;
pub mod view_runtime;
