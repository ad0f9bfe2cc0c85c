//! Utilities for logging messages from the library.

use once_cell::sync::Lazy;

/// Logs a diagnostic through the `log` facade if the session has logging enabled.
///
/// ```ignore
/// scene_log!(session, "element {} references nonexistent \"{}\"", id, name);
/// ```
#[macro_export]
macro_rules! scene_log {
    (
        $session:expr,
        $($arg:tt)+
    ) => {
        if $session.log_enabled() {
            ::log::warn!(target: "svgscene", "{}", format_args!($($arg)+));
        }
    };
}

pub fn log_enabled() -> bool {
    static ENABLED: Lazy<bool> = Lazy::new(|| ::std::env::var_os("SVGSCENE_LOG").is_some());

    *ENABLED
}
