// In crates/web-server/src/types.rs

use core_types::{Crossover, PairKey};
use serde::{Deserialize, Serialize};

/// The body of the liveness and manual-test endpoints.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub status: String,
}

/// The configured notification recipient.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatIdResponse {
    pub chat_id: Option<String>,
}

/// One stored crossover direction.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StateEntry {
    pub symbol: String,
    pub timeframe: String,
    pub direction: Crossover,
}

impl From<(PairKey, Crossover)> for StateEntry {
    fn from((key, direction): (PairKey, Crossover)) -> Self {
        Self {
            symbol: key.symbol.0,
            timeframe: key.timeframe,
            direction,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
