use log::LevelFilter;
use simplelog::{ConfigBuilder, SimpleLogger};

/// Sends `log` records (ntex request logger, error responses) to stdout
pub fn setup_simple_logger() -> anyhow::Result<()> {
    let logger_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("line_gpt_relay")
        .add_filter_allow_str("ntex")
        .build();

    Ok(SimpleLogger::init(LevelFilter::Info, logger_config)?)
}
