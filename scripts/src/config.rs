use envconfig::Envconfig;
use std::sync::LazyLock;

#[derive(Envconfig, Clone)]
pub struct AppConfig {
    #[envconfig(from = "LINE_CHANNEL_SECRET")]
    pub line_channel_secret: String,
}

pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(|| {
    AppConfig::init_from_env().expect("LINE_CHANNEL_SECRET must be set to sign deliveries")
});
