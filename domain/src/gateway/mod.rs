pub mod call_store;
