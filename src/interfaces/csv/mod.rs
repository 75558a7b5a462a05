pub mod seed_reader;
pub mod wallet_writer;
