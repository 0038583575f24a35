pub mod alert_engine;
pub mod alert_parser;
pub mod monitor_orchestrator;
pub mod process_monitor_service;
