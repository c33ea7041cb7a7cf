mod hashmap;

pub use hashmap::HashMapStorage;
