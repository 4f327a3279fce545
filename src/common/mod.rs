//! Common functionality.

use bytesize::ByteSize;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

pub use io::{open_read_maybe_gz, open_write_maybe_gz, MaybeGzWriter};

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Helper to print the current memory resident set size via `tracing`.
pub fn trace_rss_now() {
    let rss = procfs::process::Process::myself()
        .and_then(|me| me.stat())
        .map(|stat| stat.rss * procfs::page_size());
    match rss {
        Ok(rss) => tracing::debug!("RSS now: {}", ByteSize(rss)),
        Err(e) => tracing::trace!("could not determine RSS: {}", e),
    }
}

/// Format of the timestamps used in file names, e.g., `20240131_235959`.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Render `ts` for use in file names.
pub fn file_timestamp<Tz>(ts: &chrono::DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    ts.format(FILE_TIMESTAMP_FORMAT).to_string()
}

/// The version of the `genoprep` package.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    #[test]
    fn trace_rss_now_smoke() {
        super::trace_rss_now();
    }

    #[test]
    fn file_timestamp() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 7).unwrap();
        assert_eq!("20240131_235907", super::file_timestamp(&ts));
    }
}
