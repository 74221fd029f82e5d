//! Vendor response payloads, field for field.
//!
//! Every field is optional on the wire: missing or `null` values decode to
//! their defaults, so a vendor error body still yields a usable struct.

use crate::de::{lenient_i64, lenient_string, null_as_default};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Status envelope shared by all typed responses
pub trait VendorResponse: DeserializeOwned {
    /// Vendor status; zero means success.
    fn code(&self) -> i64;

    /// Human-readable failure description, empty when the endpoint has none.
    fn message(&self) -> &str;

    #[must_use]
    fn is_success(&self) -> bool {
        self.code() == 0
    }
}

macro_rules! status_envelope {
    ($ty:ty, $code:ident, $message:ident) => {
        impl VendorResponse for $ty {
            fn code(&self) -> i64 {
                self.$code
            }

            fn message(&self) -> &str {
                &self.$message
            }
        }
    };
    ($ty:ty, $code:ident) => {
        impl VendorResponse for $ty {
            fn code(&self) -> i64 {
                self.$code
            }

            fn message(&self) -> &str {
                ""
            }
        }
    };
}

/// `api/generateLink`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateLinkResponse {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub status: i64,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub des: String,
    /// Promotion link
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub data: String,
}

status_envelope!(GenerateLinkResponse, status, des);

/// `api/miniCode`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniCodeResponse {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub status: i64,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub des: String,
    /// Mini-program code image URL
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub data: String,
}

status_envelope!(MiniCodeResponse, status, des);

/// `api/getqualityscorebysid`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScoreResponse {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub status: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub des: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: QualityScorePage,
}

status_envelope!(QualityScoreResponse, status, des);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScorePage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_list: Vec<QualityScore>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total: i64,
}

/// Quality grade and 7-day repurchase rate of one promotion slot on one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    #[serde(default, deserialize_with = "lenient_string")]
    pub appkey: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quality_grade: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub repurchase_rate: String,
}

/// `{dataList, total}` page used by the union catalogue endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_list: Vec<T>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total: i64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data_list: Vec::new(),
            total: 0,
        }
    }
}

/// `{code, msg, data: Page<T>}` envelope of the union catalogue endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct UnionPageResponse<T> {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub code: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub msg: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Page<T>,
}

impl<T> Default for UnionPageResponse<T> {
    fn default() -> Self {
        Self {
            code: 0,
            msg: String::new(),
            data: Page::default(),
        }
    }
}

impl<T: DeserializeOwned> VendorResponse for UnionPageResponse<T> {
    fn code(&self) -> i64 {
        self.code
    }

    fn message(&self) -> &str {
        &self.msg
    }
}

/// `api/getcity`
pub type MtUnionCityResponse = UnionPageResponse<UnionCity>;
/// `api/getcategory`
pub type MtUnionCategoryResponse = UnionPageResponse<UnionCategory>;
/// `api/getskulist`
pub type MtUnionSkuResponse = UnionPageResponse<UnionSku>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionCity {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub city_id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionCategory {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub category_id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionSku {
    #[serde(default, deserialize_with = "lenient_string")]
    pub sku_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sku_name: String,
    /// Display price in cents
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,
    /// Main picture URL
    #[serde(default, deserialize_with = "lenient_string")]
    pub pic: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub category_id: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub sales_volume: i64,
}

/// `poi/city`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiCityResponse {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<PoiCity>,
}

status_envelope!(PoiCityResponse, code);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiCity {
    #[serde(default, deserialize_with = "lenient_string")]
    pub pinyin: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
}

/// `poi/district`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiDistrictResponse {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<PoiDistrict>,
}

status_envelope!(PoiDistrictResponse, code);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiDistrict {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
}

/// `poi/category`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiCategoryResponse {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<PoiCategory>,
}

status_envelope!(PoiCategoryResponse, code);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiCategory {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subcate: Vec<PoiSubcategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiSubcategory {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_sku_page_decodes_mixed_types() {
        let body = r#"{
            "code": 0,
            "msg": "ok",
            "data": {
                "dataList": [{
                    "skuId": "9001",
                    "skuName": "Coffee",
                    "price": "1290",
                    "pic": "https://p0.meituan.net/a.jpg",
                    "categoryId": 12.0,
                    "categoryName": "Drinks",
                    "salesVolume": 350
                }],
                "total": 1
            }
        }"#;
        let resp: MtUnionSkuResponse = serde_json::from_str(body).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.data.total, 1);
        let sku = &resp.data.data_list[0];
        assert_eq!(sku.pic, "https://p0.meituan.net/a.jpg");
        assert_eq!(sku.category_id, 12);
        assert_eq!(sku.sales_volume, 350);
    }

    #[test]
    fn test_error_body_defaults_payload() {
        let resp: QualityScoreResponse =
            serde_json::from_str(r#"{"status":1001,"des":"invalid sign","data":null}"#).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.message(), "invalid sign");
        assert_eq!(resp.data, QualityScorePage::default());
    }

    #[test]
    fn test_poi_category_nested() {
        let body = r#"{"code":0,"data":[{"name":"Food","id":1,"subcate":[{"name":"Hotpot","id":"17"}]}]}"#;
        let resp: PoiCategoryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.message(), "");
        assert_eq!(resp.data[0].subcate[0].id, 17);
    }

    #[test]
    fn test_link_response_omits_empty_fields() {
        let resp = GenerateLinkResponse {
            status: 0,
            des: String::new(),
            data: "https://dpurl.cn/x".to_owned(),
        };
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"status":0,"data":"https://dpurl.cn/x"}"#
        );
    }

    #[test]
    fn test_empty_object_is_default() {
        let resp: MtUnionCityResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp, MtUnionCityResponse::default());
    }
}
