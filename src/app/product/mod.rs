//! 产品目录：模型、存储、服务与 HTTP 处理器

pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub use model::{Product, ProductDraft, ProductPatch};
pub use repository::{MemoryProductRepository, ProductRepository};
pub use service::ProductService;
