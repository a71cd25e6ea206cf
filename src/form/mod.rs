pub mod record;
pub mod serializer;

pub use record::FormRecord;
pub use serializer::serialize;
