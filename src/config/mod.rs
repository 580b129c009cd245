/// Backend location and anonymous key, read from the environment
pub mod backend;

/// Tunables loaded from guia.toml (cache, retry, auth and HTTP settings)
pub mod settings;

pub use backend::BackendConfig;
pub use settings::{AppConfig, AuthSettings, HttpSettings, QuerySettings, load_config, load_default_config};
