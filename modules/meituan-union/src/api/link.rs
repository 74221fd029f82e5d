use crate::call::Signing;
use crate::client::Client;
use crate::error::UnionError;
use crate::models::{GenerateLinkResponse, MiniCodeResponse};
use crate::params::Params;
use crate::result::ApiResult;

const GENERATE_LINK: &str = "api/generateLink";
const MINI_CODE: &str = "api/miniCode";

impl Client {
    /// Promotion link for a campaign and promotion slot.
    ///
    /// `link_type` and `short_link` take the vendor's numeric codes.
    ///
    /// # Errors
    /// Returns [`UnionError::Transport`] when no response arrived and
    /// [`UnionError::Decode`] when the body is not the expected JSON.
    pub async fn generate_link(
        &self,
        act_id: i64,
        sid: &str,
        link_type: i32,
        short_link: i32,
    ) -> Result<ApiResult<GenerateLinkResponse>, UnionError> {
        let params = Params::new()
            .with("actId", act_id)
            .with("sid", sid)
            .with("linkType", link_type)
            .with("shortLink", short_link);
        self.call(GENERATE_LINK, Signing::Signed, params).await
    }

    /// Mini-program code image for a campaign and promotion slot.
    ///
    /// # Errors
    /// Returns [`UnionError::Transport`] when no response arrived and
    /// [`UnionError::Decode`] when the body is not the expected JSON.
    pub async fn mini_code(
        &self,
        act_id: i64,
        sid: &str,
    ) -> Result<ApiResult<MiniCodeResponse>, UnionError> {
        let params = Params::new().with("actId", act_id).with("sid", sid);
        self.call(MINI_CODE, Signing::Signed, params).await
    }
}
