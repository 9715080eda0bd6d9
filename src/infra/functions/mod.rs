pub mod channel_sender;
pub mod meta_oauth_exchange;
pub mod rag_file_processor;
