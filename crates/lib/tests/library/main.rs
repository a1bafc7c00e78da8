mod common;
mod processor_tests;
mod store_tests;
