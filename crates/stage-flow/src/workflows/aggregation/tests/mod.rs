mod common;
mod lookups;
