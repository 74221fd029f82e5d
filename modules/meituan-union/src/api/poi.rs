use crate::call::Signing;
use crate::client::Client;
use crate::error::UnionError;
use crate::models::{PoiCategoryResponse, PoiCityResponse, PoiDistrictResponse};
use crate::params::Params;
use crate::result::ApiResult;

const CITY: &str = "poi/city";
const DISTRICT: &str = "poi/district";
const CATEGORY: &str = "poi/category";

// Base-data endpoints are public and unsigned.
impl Client {
    /// Open cities.
    ///
    /// # Errors
    /// Returns [`UnionError::Transport`] when no response arrived and
    /// [`UnionError::Decode`] when the body is not the expected JSON.
    pub async fn poi_city(&self, extras: Params) -> Result<ApiResult<PoiCityResponse>, UnionError> {
        self.call(CITY, Signing::None, extras).await
    }

    /// Districts of a city. `city_id` overrides any `cityid` in `extras`.
    ///
    /// # Errors
    /// Returns [`UnionError::Transport`] when no response arrived and
    /// [`UnionError::Decode`] when the body is not the expected JSON.
    pub async fn poi_district(
        &self,
        city_id: i64,
        extras: Params,
    ) -> Result<ApiResult<PoiDistrictResponse>, UnionError> {
        self.call(DISTRICT, Signing::None, extras.with("cityid", city_id))
            .await
    }

    /// Merchant categories of a city, with subcategories. `city_id` overrides
    /// any `cityid` in `extras`.
    ///
    /// # Errors
    /// Returns [`UnionError::Transport`] when no response arrived and
    /// [`UnionError::Decode`] when the body is not the expected JSON.
    pub async fn poi_category(
        &self,
        city_id: i64,
        extras: Params,
    ) -> Result<ApiResult<PoiCategoryResponse>, UnionError> {
        self.call(CATEGORY, Signing::None, extras.with("cityid", city_id))
            .await
    }
}
