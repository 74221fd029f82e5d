use crate::call::Signing;
use crate::client::Client;
use crate::error::UnionError;
use crate::models::{MtUnionCategoryResponse, MtUnionCityResponse, MtUnionSkuResponse};
use crate::params::Params;
use crate::result::ApiResult;

const CITY: &str = "api/getcity";
const CATEGORY: &str = "api/getcategory";
const SKU_LIST: &str = "api/getskulist";

/// Union catalogue lookups. Paging and filter parameters go in `extras`.
impl Client {
    /// Cities with union campaigns.
    ///
    /// <https://union.meituan.com/v2/apiDetail?id=29>
    ///
    /// # Errors
    /// Returns [`UnionError::Transport`] when no response arrived and
    /// [`UnionError::Decode`] when the body is not the expected JSON.
    pub async fn mt_union_city(
        &self,
        extras: Params,
    ) -> Result<ApiResult<MtUnionCityResponse>, UnionError> {
        self.call(CITY, Signing::SignedWithTimestamp, extras).await
    }

    /// Product categories.
    ///
    /// <https://union.meituan.com/v2/apiDetail?id=30>
    ///
    /// # Errors
    /// Returns [`UnionError::Transport`] when no response arrived and
    /// [`UnionError::Decode`] when the body is not the expected JSON.
    pub async fn mt_union_category(
        &self,
        extras: Params,
    ) -> Result<ApiResult<MtUnionCategoryResponse>, UnionError> {
        self.call(CATEGORY, Signing::SignedWithTimestamp, extras).await
    }

    /// Promotable SKUs.
    ///
    /// <https://union.meituan.com/v2/apiDetail?id=31>
    ///
    /// # Errors
    /// Returns [`UnionError::Transport`] when no response arrived and
    /// [`UnionError::Decode`] when the body is not the expected JSON.
    pub async fn mt_union_sku(
        &self,
        extras: Params,
    ) -> Result<ApiResult<MtUnionSkuResponse>, UnionError> {
        self.call(SKU_LIST, Signing::SignedWithTimestamp, extras).await
    }
}
