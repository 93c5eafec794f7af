use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;
use tabled::Tabled;

pub type StationId = Arc<str>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum StationStatus {
    Active,
    Disabled,
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            StationStatus::Active => "active",
            StationStatus::Disabled => "disabled",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tabled)]
pub struct Station {
    pub id: StationId,
    pub name: Arc<str>,
    pub status: StationStatus,
    pub max_bikes: u32,
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
