use crate::call::Signing;
use crate::client::Client;
use crate::error::UnionError;
use crate::models::QualityScoreResponse;
use crate::params::Params;
use crate::result::ApiResult;

const QUALITY_SCORE_BY_SID: &str = "api/getqualityscorebysid";

impl Client {
    /// Quality grade and 7-day repurchase rate per promotion slot.
    ///
    /// Filters (`sid`, `beginDate`, `endDate`, `page`, `limit`, ...) go in
    /// `extras` as the vendor names them.
    ///
    /// # Errors
    /// Returns [`UnionError::Transport`] when no response arrived and
    /// [`UnionError::Decode`] when the body is not the expected JSON.
    pub async fn quality_score_by_sid(
        &self,
        extras: Params,
    ) -> Result<ApiResult<QualityScoreResponse>, UnionError> {
        self.call(QUALITY_SCORE_BY_SID, Signing::SignedWithTimestamp, extras)
            .await
    }
}
