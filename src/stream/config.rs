//! Stream controller configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::server::config::DEFAULT_PORT;

/// Placeholder replaced by the ingest locator in pipeline arguments
pub const INGEST_PLACEHOLDER: &str = "{ingest}";

/// Placeholder replaced by the output locator in pipeline arguments
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Placeholder replaced by the URL of the hub's own overlay page
pub const OVERLAY_PLACEHOLDER: &str = "{overlay}";

/// Placeholder replaced by the directory HLS preview segments go to
pub const HLS_ROOT_PLACEHOLDER: &str = "{hls_root}";

/// Subdirectory of the static root holding the admin HLS preview
pub const HLS_SUBDIR: &str = "admin";

/// Default pipeline: restream the ingest to the output unchanged
pub const DEFAULT_PIPELINE: &str = "ffmpeg -re -i {ingest} -c copy -f flv {output}";

/// Number of stderr lines kept for error reports
pub const DEFAULT_STDERR_TAIL: usize = 20;

/// Configuration for the external pipeline process
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Source the pipeline ingests (URI or path)
    pub ingest: String,

    /// Target the pipeline restreams to (e.g. an RTMP URL)
    pub output: String,

    /// Overlay page the pipeline may composite onto the video
    pub overlay_url: String,

    /// Directory for an HLS preview written by the pipeline
    pub hls_root: PathBuf,

    /// Pipeline executable
    pub program: String,

    /// Pipeline arguments, with placeholders
    pub args: Vec<String>,

    /// Lines of pipeline stderr attached to error events
    pub stderr_tail: usize,
}

impl StreamConfig {
    /// Create a config using the default pipeline
    pub fn new(ingest: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            ingest: ingest.into(),
            output: output.into(),
            overlay_url: overlay_url(SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT))),
            hls_root: Path::new("public").join(HLS_SUBDIR),
            program: String::new(),
            args: Vec::new(),
            stderr_tail: DEFAULT_STDERR_TAIL,
        }
        .command_line(DEFAULT_PIPELINE)
    }

    /// Point `{overlay}` and `{hls_root}` at the hub serving from `bind`
    /// and `static_dir`
    pub fn served_from(mut self, bind: SocketAddr, static_dir: &Path) -> Self {
        self.overlay_url = overlay_url(bind);
        self.hls_root = static_dir.join(HLS_SUBDIR);
        self
    }

    /// Replace the pipeline with a whitespace-separated command line
    ///
    /// An empty command line leaves the current pipeline in place.
    pub fn command_line(mut self, line: &str) -> Self {
        let mut words = line.split_whitespace().map(str::to_string);
        if let Some(program) = words.next() {
            self.program = program;
            self.args = words.collect();
        }
        self
    }

    /// Set the pipeline executable and arguments directly
    pub fn command(mut self, program: impl Into<String>, args: &[&str]) -> Self {
        self.program = program.into();
        self.args = args.iter().map(|arg| arg.to_string()).collect();
        self
    }

    /// Arguments with every placeholder substituted
    pub fn resolved_args(&self) -> Vec<String> {
        let hls_root = self.hls_root.to_string_lossy();

        self.args
            .iter()
            .map(|arg| {
                arg.replace(INGEST_PLACEHOLDER, &self.ingest)
                    .replace(OUTPUT_PLACEHOLDER, &self.output)
                    .replace(OVERLAY_PLACEHOLDER, &self.overlay_url)
                    .replace(HLS_ROOT_PLACEHOLDER, &hls_root)
            })
            .collect()
    }
}

/// URL a local pipeline reaches the overlay page on
///
/// A wildcard bind address is reached through loopback.
fn overlay_url(bind: SocketAddr) -> String {
    let ip = match bind.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}", SocketAddr::new(ip, bind.port()))
}
