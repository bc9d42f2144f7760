pub mod elasticsearch;
pub mod traits;

pub use elasticsearch::{AuthMethod, ElasticsearchClient};
pub use traits::{FieldCapsQuery, FieldCapsSource, FieldSelector};
