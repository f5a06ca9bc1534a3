//! Thin wrapper over the `log` facade, namespaced macros with optional context.
use alloc::format;
use alloc::string::String;

/// Implemented by structs that can describe themselves for a log line prefix.
pub trait LogMetadata {
    fn meta(&self) -> String;
}

/// Common `[onu=.., alloc=..]`-style context carried by DBA log lines.
pub struct DbaLogContext {
    pub component: &'static str,
    pub onu_id: Option<u16>,
    pub alloc_id: Option<u16>,
}

impl LogMetadata for DbaLogContext {
    fn meta(&self) -> String {
        match (self.onu_id, self.alloc_id) {
            (Some(onu), Some(alloc)) => {
                format!("component={}, onu={}, alloc={}", self.component, onu, alloc)
            }
            (Some(onu), None) => format!("component={}, onu={}", self.component, onu),
            (None, Some(alloc)) => format!("component={}, alloc={}", self.component, alloc),
            (None, None) => format!("component={}", self.component),
        }
    }
}

macro_rules! dba_trace {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        log::trace!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
    ($fmt:literal $(, $($arg:tt)+)?) => {{ log::trace!($fmt $(, $($arg)+)?); }};
}

macro_rules! dba_debug {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        log::debug!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
    ($fmt:literal $(, $($arg:tt)+)?) => {{ log::debug!($fmt $(, $($arg)+)?); }};
}

macro_rules! dba_warn {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        log::warn!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
    ($fmt:literal $(, $($arg:tt)+)?) => {{ log::warn!($fmt $(, $($arg)+)?); }};
}

pub(crate) use dba_debug;
pub(crate) use dba_trace;
pub(crate) use dba_warn;
