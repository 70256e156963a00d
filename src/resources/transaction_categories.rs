//! Transaction categories service.

use serde_json::Value;

use crate::models::{TransactionCategory, TransactionCategoryCreateRequest};
use crate::pagination::{decode_page, Page, PageParams};
use crate::request::{path_id, ApiRequest};
use crate::transport::Transport;
use crate::Result;

const PATH: &str = "/transaction-categories";

/// Filters for listing categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTransactionCategoriesParams {
    /// Only subcategories of this category.
    pub parent_id: Option<String>,
    /// Page selection.
    pub page: PageParams,
}

impl ListTransactionCategoriesParams {
    /// Restricts the list to subcategories of `parent_id`.
    pub fn parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Selects the page to fetch.
    pub fn page(mut self, page: PageParams) -> Self {
        self.page = page;
        self
    }
}

/// Service for transaction categories.
#[derive(Clone)]
pub struct TransactionCategories {
    transport: Transport,
}

impl TransactionCategories {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Creates a category, or a subcategory when `parent_id` is set.
    pub async fn create(
        &self,
        request: &TransactionCategoryCreateRequest,
    ) -> Result<TransactionCategory> {
        request.validate()?;
        let request = ApiRequest::post(PATH).with_json(request)?;
        self.transport.execute(request).await
    }

    /// Lists categories, one page per call.
    pub async fn list(
        &self,
        params: ListTransactionCategoriesParams,
    ) -> Result<Page<TransactionCategory>> {
        let request = params
            .page
            .apply(ApiRequest::get(PATH))?
            .with_optional_query_param("parentId", params.parent_id.as_deref());
        let body: Value = self.transport.execute(request).await?;
        decode_page(body, &params.page)
    }

    /// Permanently deletes a category.
    ///
    /// This cannot be undone. Transactions filed under the category lose their
    /// category reference, which shows on their next fetch.
    pub async fn delete(&self, category_id: &str) -> Result<()> {
        let path = format!("{}/{}", PATH, path_id("category_id", category_id)?);
        let _: Value = self.transport.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }
}
