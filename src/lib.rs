pub mod classifier;
pub mod classify_client;
pub mod error;
pub mod feed_state;
pub mod image_source;
pub mod io_struct;
pub mod latest_cache;
pub mod server;
pub mod test_utils;
