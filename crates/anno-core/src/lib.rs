pub mod error;
pub mod id;
pub mod model;
pub mod registry;
pub mod snapshot;

pub use error::EditError;
pub use id::LayerId;
pub use model::*;
pub use registry::LayerRegistry;
