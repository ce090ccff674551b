use std::path::Path;

use super::config::Config;
use super::constants::NUM_CHANNELS;
use super::error::ProcessorError;
use super::log_file::LogFile;
use super::scanner;
use super::stream::DecodedStream;

/// Decode one downlink log according to the configured options.
pub fn process_file(config: &Config, path: &Path) -> Result<DecodedStream, ProcessorError> {
    let file = LogFile::open(path)?;
    spdlog::info!(
        "Processing {} ({})",
        file.path.display(),
        human_bytes::human_bytes(file.size_bytes() as f64)
    );

    let stream = scanner::decode_log(&file, &config.options)?;

    for channel in 0..NUM_CHANNELS {
        spdlog::info!(
            "Channel {}: {} event samples",
            channel + 1,
            stream.amplitude.channels[channel].len()
        );
    }
    spdlog::info!("Telemetry entries: {}", stream.uscount.len());
    if let Some(ci) = stream.ci.as_ref() {
        spdlog::info!("Injection runs: {}", ci.amplitude.channels[0].n_runs());
    }
    if !stream.live_time.is_empty() {
        spdlog::info!("Live time intervals: {}", stream.live_time.len());
    }
    spdlog::info!("Done with {}.", file.path.display());
    Ok(stream)
}

/// Decode every log file named by the configuration, in order.
pub fn process(config: &Config) -> Result<Vec<DecodedStream>, ProcessorError> {
    let mut streams = Vec::with_capacity(config.log_files.len());
    for path in config.log_files.iter() {
        streams.push(process_file(config, path)?);
    }
    Ok(streams)
}
