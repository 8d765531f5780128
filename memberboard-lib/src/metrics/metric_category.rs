use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Deserialize, Serialize)]
pub enum MetricCategory {
    Membership,
    Revenue,
    Retention,
}
