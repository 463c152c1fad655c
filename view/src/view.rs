//! 产品列表页状态

use tracing::{info, warn};

use crate::api::ProductApi;
use crate::dialog::{DeleteDialog, FormDialog, SessionToken};
use crate::error::ViewError;
use crate::model::{Product, ProductForm};
use crate::pipeline::{self, SortOrder};

/// 已通过本地校验的新建请求
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCreate {
    pub token: SessionToken,
    pub form: ProductForm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub token: SessionToken,
    pub id: i64,
    pub form: ProductForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDelete {
    pub token: SessionToken,
    pub id: i64,
}

/// 过滤、排序后的一页
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<&'a Product>,
    /// 从 1 开始
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// 产品本地副本及列表页的全部状态
///
/// 只能通过下列方法修改状态。远程修改分三步：`begin_*`（校验并标记提交中）、
/// 调用服务端、`complete_*`（合并服务端返回的记录）；`submit_*` 依次执行这三步。
#[derive(Debug, Default)]
pub struct ProductListView {
    products: Vec<Product>,
    search_term: String,
    sort_order: SortOrder,
    current_page: usize,
    create_dialog: FormDialog,
    edit_dialog: FormDialog,
    delete_dialog: DeleteDialog,
    last_error: Option<ViewError>,
}

impl ProductListView {
    pub fn new() -> Self {
        Self {
            current_page: 1,
            ..Self::default()
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// 下一次 `toggle_sort` 使用的方向
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn create_dialog(&self) -> &FormDialog {
        &self.create_dialog
    }

    pub fn edit_dialog(&self) -> &FormDialog {
        &self.edit_dialog
    }

    pub fn delete_dialog(&self) -> &DeleteDialog {
        &self.delete_dialog
    }

    pub fn last_error(&self) -> Option<&ViewError> {
        self.last_error.as_ref()
    }

    // ---- 加载 ----

    /// 用服务端列表替换本地副本，失败时本地副本为空
    pub async fn load(&mut self, api: &dyn ProductApi) -> Result<(), ViewError> {
        self.products.clear();
        self.current_page = 1;

        match api.list().await {
            Ok(products) => {
                info!("loaded {} products", products.len());
                self.products = products;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                warn!("failed to load products: {}", err);
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    // ---- 过滤 / 排序 / 分页 ----

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.clamp_page();
    }

    /// 按当前方向对整个本地副本按价格排序，然后翻转方向
    pub fn toggle_sort(&mut self) {
        pipeline::sort_by_price(&mut self.products, self.sort_order);
        self.sort_order = self.sort_order.flipped();
    }

    pub fn filtered(&self) -> Vec<&Product> {
        pipeline::filter_by_name(&self.products, &self.search_term)
    }

    pub fn total_pages(&self) -> usize {
        pipeline::page_count(self.filtered().len())
    }

    pub fn current_page(&self) -> usize {
        self.current_page.clamp(1, self.total_pages())
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page;
        self.clamp_page();
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page() + 1);
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.current_page().saturating_sub(1));
    }

    pub fn page(&self) -> Page<'_> {
        let filtered = self.filtered();
        let total_items = filtered.len();
        let number = pipeline::clamp_page(self.current_page, total_items);
        Page {
            items: pipeline::page_slice(&filtered, number).to_vec(),
            number,
            total_pages: pipeline::page_count(total_items),
            total_items,
        }
    }

    fn clamp_page(&mut self) {
        self.current_page = pipeline::clamp_page(self.current_page, self.filtered().len());
    }

    // ---- 新建 ----

    /// 以空表单打开新建对话框
    pub fn open_create(&mut self) -> SessionToken {
        self.create_dialog.open(ProductForm::default(), None)
    }

    pub fn create_form_mut(&mut self) -> Option<&mut ProductForm> {
        self.create_dialog.form_mut()
    }

    pub fn cancel_create(&mut self) {
        self.create_dialog.cancel();
    }

    pub fn begin_create(&mut self) -> Result<PendingCreate, ViewError> {
        match self.create_dialog.begin_submit() {
            Some(Ok((token, form))) => Ok(PendingCreate { token, form }),
            Some(Err(errors)) => Err(ViewError::Validation(errors)),
            None => Err(ViewError::DialogClosed),
        }
    }

    /// 追加服务端返回的记录；旧会话的响应仍会合并记录，但不改变对话框
    pub fn complete_create(
        &mut self,
        token: SessionToken,
        result: Result<Product, ViewError>,
    ) -> Result<Product, ViewError> {
        match result {
            Ok(product) => {
                self.upsert(product.clone());
                if !self.create_dialog.finish(token, None) {
                    info!("create for session {} completed after dialog moved on", token);
                }
                Ok(product)
            }
            Err(err) => {
                self.fail_form(token, &err, Dialog::Create);
                Err(err)
            }
        }
    }

    pub async fn submit_create(&mut self, api: &dyn ProductApi) -> Result<Product, ViewError> {
        let pending = self.begin_create()?;
        let result = api.create(&pending.form).await;
        self.complete_create(pending.token, result)
    }

    // ---- 编辑 ----

    /// 用本地记录填充并打开编辑对话框；`id` 不在本地副本中时返回 `false`
    pub fn open_edit(&mut self, id: i64) -> bool {
        let Some(product) = self.products.iter().find(|p| p.id == id) else {
            return false;
        };
        let form = ProductForm::from(product);
        self.edit_dialog.open(form, Some(id));
        true
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut ProductForm> {
        self.edit_dialog.form_mut()
    }

    pub fn cancel_edit(&mut self) {
        self.edit_dialog.cancel();
    }

    pub fn begin_update(&mut self) -> Result<PendingUpdate, ViewError> {
        let Some(id) = self.edit_dialog.target() else {
            return Err(ViewError::DialogClosed);
        };
        match self.edit_dialog.begin_submit() {
            Some(Ok((token, form))) => Ok(PendingUpdate { token, id, form }),
            Some(Err(errors)) => Err(ViewError::Validation(errors)),
            None => Err(ViewError::DialogClosed),
        }
    }

    /// 原地替换对应的本地记录
    pub fn complete_update(
        &mut self,
        token: SessionToken,
        result: Result<Product, ViewError>,
    ) -> Result<Product, ViewError> {
        match result {
            Ok(product) => {
                if let Some(slot) = self.products.iter_mut().find(|p| p.id == product.id) {
                    *slot = product.clone();
                }
                self.clamp_page();
                if !self.edit_dialog.finish(token, None) {
                    info!("update for session {} completed after dialog moved on", token);
                }
                Ok(product)
            }
            Err(err) => {
                self.fail_form(token, &err, Dialog::Edit);
                Err(err)
            }
        }
    }

    pub async fn submit_update(&mut self, api: &dyn ProductApi) -> Result<Product, ViewError> {
        let pending = self.begin_update()?;
        let result = api.update(pending.id, &pending.form).await;
        self.complete_update(pending.token, result)
    }

    // ---- 删除 ----

    /// 选择待删除的 `id` 并打开确认框；`id` 不在本地副本中时返回 `false`
    pub fn request_delete(&mut self, id: i64) -> bool {
        if !self.products.iter().any(|p| p.id == id) {
            return false;
        }
        self.delete_dialog.open(id);
        true
    }

    pub fn clear_delete_selection(&mut self) {
        self.delete_dialog.clear_selection();
    }

    pub fn cancel_delete(&mut self) {
        self.delete_dialog.cancel();
    }

    /// 没有可确认的选择时返回 `None`
    pub fn begin_delete(&mut self) -> Option<PendingDelete> {
        self.delete_dialog
            .begin_submit()
            .map(|(token, id)| PendingDelete { token, id })
    }

    pub fn complete_delete(
        &mut self,
        pending: PendingDelete,
        result: Result<(), ViewError>,
    ) -> Result<(), ViewError> {
        match result {
            Ok(()) => {
                self.products.retain(|p| p.id != pending.id);
                self.clamp_page();
                self.delete_dialog.finish(pending.token, None);
                info!("deleted product {}", pending.id);
                Ok(())
            }
            Err(err) => {
                warn!("failed to delete product {}: {}", pending.id, err);
                if self.delete_dialog.finish(pending.token, Some(err.to_string())) {
                    self.last_error = Some(err.clone());
                }
                Err(err)
            }
        }
    }

    /// 删除已确认的选择；未选择时返回 `Ok(false)`，不访问服务端
    pub async fn confirm_delete(&mut self, api: &dyn ProductApi) -> Result<bool, ViewError> {
        let Some(pending) = self.begin_delete() else {
            return Ok(false);
        };
        let result = api.delete(pending.id).await;
        self.complete_delete(pending, result).map(|()| true)
    }

    // ---- 辅助方法 ----

    fn upsert(&mut self, product: Product) {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => *slot = product,
            None => self.products.push(product),
        }
        self.clamp_page();
    }

    fn fail_form(&mut self, token: SessionToken, err: &ViewError, which: Dialog) {
        let dialog = match which {
            Dialog::Create => &mut self.create_dialog,
            Dialog::Edit => &mut self.edit_dialog,
        };
        // 服务端校验错误显示在字段旁，其它错误记录到 `last_error`
        let field_errors = err.field_errors().cloned().unwrap_or_default();
        if dialog.finish(token, Some(field_errors)) && err.field_errors().is_none() {
            warn!("product request failed: {}", err);
            self.last_error = Some(err.clone());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Dialog {
    Create,
    Edit,
}
