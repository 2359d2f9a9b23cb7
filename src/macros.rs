#[macro_export]
macro_rules! bitfont_log {
    (target: $target:expr, $($arg:tt)+) => (
        #[cfg(feature = "log")] {
            log::log!(target: $target, log::Level::Debug, $($arg)+)
        }
    );
    ($($arg:tt)+) => (
        #[cfg(feature = "log")] {
            log::log!(log::Level::Debug, $($arg)+)
        }
    )
}

#[macro_export]
macro_rules! bitfont_warn {
    (target: $target:expr, $($arg:tt)+) => (
        #[cfg(feature = "log")] {
            log::log!(target: $target, log::Level::Warn, $($arg)+)
        }
    );
    ($($arg:tt)+) => (
        #[cfg(feature = "log")] {
            log::log!(log::Level::Warn, $($arg)+)
        }
    )
}
