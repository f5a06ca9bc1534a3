//! DBA policy implementations (`spec.md` §4.2, §9).
pub mod qos_aware;
pub mod round_robin;

pub use qos_aware::{QosAwarePolicy, QosMode};
pub use round_robin::RoundRobinPolicy;
