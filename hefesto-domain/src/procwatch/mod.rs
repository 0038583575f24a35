pub mod alert_result;
pub mod alert_rule;
pub mod jvm_metrics;
pub mod process_sample;
