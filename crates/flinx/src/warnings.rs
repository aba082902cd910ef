use std::sync::atomic::{AtomicBool, Ordering};

// Warnings are disabled by default until `--quiet` has been checked.
pub(crate) static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable user-facing warnings.
pub(crate) fn enable() {
    ENABLED.store(true, Ordering::SeqCst);
}

/// Disable user-facing warnings.
pub(crate) fn disable() {
    ENABLED.store(false, Ordering::SeqCst);
}

/// Warn a user, if warnings are enabled.
#[macro_export]
macro_rules! warn_user {
    ($($arg:tt)*) => {{
        use anstream::eprintln;
        use owo_colors::OwoColorize;

        if $crate::warnings::ENABLED.load(std::sync::atomic::Ordering::SeqCst) {
            let message = format!("{}", format_args!($($arg)*));
            let formatted = message.bold();
            eprintln!("{}{} {formatted}", "warning".yellow().bold(), ":".bold());
        }
    }};
}
