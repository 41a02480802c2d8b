pub mod invoicing_client;
