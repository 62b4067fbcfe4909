//! Macros for last-resort debugging.
//!
//! Since decoding errors only carry an offset and a decode path, finding
//! out which check in the codec produced an error can be tedious. To
//! remedy this somewhat, this module contains a macro `xerr!()` that will
//! print out a backtrace if the `extra-debug` feature is enabled during
//! build before resolving into whatever the expression it encloses
//! resolves to otherwise.
//!
//! The macro is used where errors are created, i.e., in
//! [`Error::new`][crate::Error::new], so every error of a build with the
//! feature enabled leaves a trace on stderr:
//!
//! ```rust,ignore
//! xerr!(Error { kind, msg, offset: None, path: None })
//! ```

#[cfg(feature = "extra-debug")]
pub use backtrace::Backtrace;

#[cfg(feature = "extra-debug")]
#[macro_export]
macro_rules! xerr {
    ($test:expr) => {{
        eprintln!(
            "--- EXTRA DEBUG ---\n{:?}\n--- EXTRA DEBUG ---",
            $crate::debug::Backtrace::new()
        );
        $test
    }}
}

#[cfg(not(feature = "extra-debug"))]
#[macro_export]
macro_rules! xerr {
    ($test:expr) => { $test };
}
