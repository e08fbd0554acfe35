//! Profiling utilities based on the `puffin` crate.
//!
//! Handler resolution and style application are annotated with
//! [`profile_function!`]; scopes are only recorded once
//! [`init_profiling`] has turned them on.

use std::sync::OnceLock;

pub use puffin::{GlobalProfiler, profile_function, profile_scope};

/// Address the puffin HTTP server listens on.
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8585";

/// Profiling backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingBackend {
    /// Record scopes in-process only (inspect through [`GlobalProfiler`]).
    InProcess,
    /// Send profiling data to puffin_viewer via HTTP.
    PuffinHttp,
}

static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

/// Initialize profiling with the specified backend.
///
/// # Example
/// ```no_run
/// use weft_core::profiling::{init_profiling, ProfilingBackend};
///
/// init_profiling(ProfilingBackend::PuffinHttp);
/// ```
pub fn init_profiling(backend: ProfilingBackend) {
    puffin::set_scopes_on(true);

    if backend == ProfilingBackend::PuffinHttp {
        match puffin_http::Server::new(DEFAULT_SERVER_ADDR) {
            Ok(server) => {
                tracing::info!("Puffin profiler server started on http://{}", DEFAULT_SERVER_ADDR);
                let _ = PROFILING_SERVER.set(server);
            }
            Err(e) => {
                tracing::error!("Failed to start puffin server: {}", e);
            }
        }
    }
}

/// Whether scope recording is currently enabled.
pub fn is_enabled() -> bool {
    puffin::are_scopes_on()
}

/// Mark a frame boundary so recorded scopes are grouped per UI pass.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}
