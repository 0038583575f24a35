pub mod docker_service;
pub mod health_check_service;
pub mod jvm_metrics_service;
pub mod port_info_service;
pub mod process_enrichment_service;
pub mod security_analysis_service;
pub mod service_registry;
