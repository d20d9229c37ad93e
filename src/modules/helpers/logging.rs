use fern::Dispatch;

use crate::modules::config::LoggingConfig;

pub fn setup_logging(config: &LoggingConfig) -> Result<(), fern::InitError> {
    let base_config = Dispatch::new()
        .level(config.level)
        // rocket logs every request on its own targets, keep those at warn
        .level_for("rocket", log::LevelFilter::Warn)
        .level_for("_", log::LevelFilter::Warn);

    let formatted = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .chain(std::io::stdout())
        .chain(fern::log_file(&config.file)?);

    base_config
        .chain(formatted)
        .apply()?;

    Ok(())
}
