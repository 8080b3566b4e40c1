pub mod product_registry;

pub use product_registry::ProductRegistryClient;
