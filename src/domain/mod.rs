// Domain layer - Devices, telemetry values and graph selection
pub mod device;
pub mod graph;
pub mod telemetry;
