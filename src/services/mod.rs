pub mod aggregation;
pub mod batch_validator;
pub mod batch_writer;
pub mod brand_resolver;
pub mod photo_storage;
