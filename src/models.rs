pub mod invoice;
pub mod store;
