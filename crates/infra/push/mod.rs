pub mod push_client;
