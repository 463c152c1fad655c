//! # 产品管理页客户端状态
//!
//! [`ProductListView`] 持有产品的本地副本，经过 过滤 → 排序 → 分页 得到当前页，
//! 并通过 [`ProductApi`] 驱动新建、编辑、删除对话框。

pub mod api;
pub mod dialog;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod view;

pub use api::{HttpProductClient, ProductApi};
pub use dialog::{DeleteDialog, DeleteState, FormDialog, FormState, SessionToken};
pub use error::{FieldErrors, ViewError};
pub use model::{coerce_price, Product, ProductForm};
pub use pipeline::{SortOrder, PAGE_SIZE};
pub use view::{Page, PendingCreate, PendingDelete, PendingUpdate, ProductListView};
