//! Configuration module for lexdrift
//!
//! This module handles:
//! - Project-level configuration (lexdrift.toml)
//! - Prevalence, significance and bootstrap settings
//! - The declarative article exception list

mod project_config;

pub use project_config::{
    load_config,
    load_config_from,
    BootstrapConfig,
    CorpusConfig,
    FilterConfig,
    OutputConfig,
    ProjectConfig,
    TokenizerConfig,
    TrendConfig,
    CONFIG_FILE_NAME,
    EXAMPLE_CONFIG,
};
