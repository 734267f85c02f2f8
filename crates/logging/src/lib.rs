// crates/logging/src/lib.rs

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    fmt,
    layer::{Layer as _, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

/// Build the subscriber for the given verbosity.
///
/// Diagnostics go to stderr so reports on stdout stay machine-readable.
/// `RUST_LOG` can still override the default directive.
pub fn subscriber(verbose: u8, quiet: bool) -> Box<dyn tracing::Subscriber + Send + Sync> {
    let level = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let fmt_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .boxed();
    Box::new(tracing_subscriber::registry().with(filter).with(fmt_layer))
}

pub fn init(verbose: u8, quiet: bool) {
    subscriber(verbose, quiet).init();
}

/// Render a byte count the way the statistics report expects: plain bytes
/// below one KiB, three decimals above.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.3} {}", size, UNITS[unit])
}
