pub mod field_caps;
pub mod normalize;
pub mod types;

pub use field_caps::FieldCapsResponse;
pub use normalize::{TypeNormalizer, TypeTable, UnsupportedType};
pub use types::{FieldCapabilities, FieldCategory, NormalizedFieldMap, NormalizedType};
