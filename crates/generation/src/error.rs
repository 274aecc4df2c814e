use thiserror::Error;

use crate::city::DistrictId;
use crate::edge::EdgeId;
use crate::events::RegionKey;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("edge {edge:?} not found in {owner:?}")]
    EdgeNotFound { owner: RegionKey, edge: EdgeId },

    #[error("district {0:?} not found")]
    DistrictNotFound(DistrictId),

    #[error("invalid value {value} for parameter `{key}`")]
    InvalidParameter { key: String, value: f32 },

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("failed to parse generation config: {0}")]
    Config(#[from] serde_json::Error),
}
