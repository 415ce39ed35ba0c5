//! Integration tests of the transaction pool.

mod concurrency;
mod pool;

const fn main() {}
