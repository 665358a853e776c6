//! Configuration system: schemas with embedded defaults, TOML loading,
//! environment overrides and global access.

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{ CacheConfig, Config, CsrfConfig, DonationConfig, ProfileConfig, RateLimitConfig };
pub use utils::{
    apply_overrides,
    get_config_clone,
    install_config,
    is_config_initialized,
    load_config,
    load_config_from_path,
    load_config_from_str,
    read_config_file,
    with_config,
    CONFIG_FILE_PATH,
};
