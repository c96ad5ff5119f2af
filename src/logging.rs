use cfg_if::cfg_if;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_subscriber::util::SubscriberInitExt;

/// Used when RUST_LOG is unset: interaction traces from this crate, info for everything else.
const DEFAULT_FILTER: &str = "info,xr_grab=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Route tracing to the browser console. Safe to call more than once.
        pub fn init() {
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            if tracing_subscriber::registry()
                .with(env_filter())
                .with(wasm_layer)
                .try_init()
                .is_err()
            {
                tracing::debug!("logging already initialized");
                return;
            }

            // Panics with stacktrace
            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;
        use std::env;
        use std::ffi::OsStr;
        use std::io;
        use std::path::Path;
        use once_cell::sync::OnceCell;

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Host logging for tests and tooling: stderr plus a daily-rolled file.
        pub fn init() {
            if FILE_GUARD.get().is_some() {
                return;
            }

            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();

            // RUST_LOG_FILE=logs/xr-grab.log by default
            let log_path = env::var("RUST_LOG_FILE").unwrap_or_else(|_| "logs/xr-grab.log".to_string());
            let path = Path::new(&log_path);
            let (nb_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
                path.parent().unwrap_or(Path::new(".")),
                path.file_name().unwrap_or(OsStr::new("xr-grab.log")),
            ));

            let file_layer = fmt::layer()
                .with_writer(nb_writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .compact();

            if tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_err()
            {
                // Someone else installed a global subscriber first; keep theirs
                return;
            }
            let _ = FILE_GUARD.set(guard);

            let default_hook = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let location = info
                    .location()
                    .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
                    .unwrap_or_default();
                let payload = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "<non-string panic>".to_string());
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!(%location, "panic: {payload}\nBacktrace:\n{bt}");
                default_hook(info);
            }));
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
