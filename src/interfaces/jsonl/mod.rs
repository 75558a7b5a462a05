pub mod order_writer;
pub mod request;
