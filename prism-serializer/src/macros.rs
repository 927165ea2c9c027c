// prism_serializer/src/macros.rs
//
// Declarative helper macros. The logging macros skip argument formatting
// entirely when the level is disabled.

#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)*) => {{
        if ::log::log_enabled!(::log::Level::Trace) {
            ($logger).trace_args(format_args!($($arg)*));
        }
    }}
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {{
        if ::log::log_enabled!(::log::Level::Debug) {
            ($logger).debug_args(format_args!($($arg)*));
        }
    }}
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {{
        if ::log::log_enabled!(::log::Level::Info) {
            ($logger).info_args(format_args!($($arg)*));
        }
    }}
}

/// Create a `Value::Map` from key-value pairs.
///
/// Keys are converted to strings and values go through `Value::from`, so
/// plain Rust literals can be written directly. Insertion order is kept.
///
/// ```
/// use prism_serializer::{record, Value};
///
/// let source = record! { "foo" => "bar", "bar" => 5, "ok" => true };
/// assert_eq!(source.attribute("bar").unwrap(), Value::Int(5));
/// ```
#[macro_export]
macro_rules! record {
    {} => {
        $crate::Value::Map($crate::Record::new())
    };

    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut record = $crate::Record::new();
            $(record.insert($key, $crate::Value::from($value));)+
            $crate::Value::Map(record)
        }
    };
}
