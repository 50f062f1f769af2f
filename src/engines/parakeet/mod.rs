pub mod engine;
pub mod model;
pub mod timestamps;

pub use engine::{ParakeetEngine, ParakeetInferenceParams, ParakeetModelParams, QuantizationType};
pub use model::{ParakeetError, ParakeetModel, TimestampedResult};
pub use timestamps::TimestampGranularity;
