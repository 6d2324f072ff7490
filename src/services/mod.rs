pub mod intake;
pub mod upload_store;
