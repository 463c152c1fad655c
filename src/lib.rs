//! # 产品目录服务
//!
//! 分层结构：
//! - `app`：产品模型、存储、业务服务与 HTTP 路由
//! - `core`：错误处理、中间件、配置
//! - `infrastructure`：数据库连接池与日志初始化

pub mod app;
pub mod core;
pub mod infrastructure;

pub use crate::app::build_router;
pub use crate::app::product::{
    MemoryProductRepository, Product, ProductDraft, ProductPatch, ProductRepository,
    ProductService,
};
pub use crate::core::config::{find_config_file, load_config, Config, ConfigError};
pub use crate::core::error::CoreError;
