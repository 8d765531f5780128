use core::fmt::{Display, Formatter};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    UInt(u64),
    Int(i64),

    /// Dollars.
    Money(f64),
    Percent(f64),
}

impl Display for MetricValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UInt(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value:+}"),
            Self::Money(value) if *value < 0.0 => write!(f, "-${:.2}", value.abs()),
            Self::Money(value) => write!(f, "${value:.2}"),
            Self::Percent(value) => write!(f, "{value:+.1}%"),
        }
    }
}
