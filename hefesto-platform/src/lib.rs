pub mod port_parser;
pub mod process_sampler;
pub mod system_info;
