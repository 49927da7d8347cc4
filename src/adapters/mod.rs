pub mod memory_source;
