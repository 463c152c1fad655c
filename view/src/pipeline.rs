//! 本地副本的 过滤 → 排序 → 分页

use crate::model::Product;

pub const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// 按名称不区分大小写的子串匹配，空关键字匹配全部
pub fn filter_by_name<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let needle = term.to_lowercase();
    products
        .iter()
        .filter(|product| needle.is_empty() || product.name.to_lowercase().contains(&needle))
        .collect()
}

/// 按价格稳定排序，同价保持原有顺序
pub fn sort_by_price(products: &mut [Product], order: SortOrder) {
    match order {
        SortOrder::Ascending => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOrder::Descending => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }
}

/// `ceil(len / PAGE_SIZE)`，至少为 1
pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE).max(1)
}

/// 将页码（从 1 开始）限制在 `1..=page_count(len)`
pub fn clamp_page(page: usize, len: usize) -> usize {
    page.clamp(1, page_count(len))
}

/// 第 `page` 页的条目，越界时为空
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    if start >= items.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}
