use anyhow::Result;
use clap::{Args, Subcommand};
use meituan_union::{ApiResult, Client, Params, VendorResponse};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the effective configuration (YAML, secret redacted) and exit
    PrintConfig,
    #[command(flatten)]
    Api(ApiCommand),
}

/// One vendor endpoint per subcommand.
#[derive(Debug, Subcommand)]
pub enum ApiCommand {
    /// Promotion link for a campaign and promotion slot
    GenerateLink {
        #[arg(long)]
        act_id: i64,
        #[arg(long)]
        sid: String,
        /// Vendor link type code
        #[arg(long, default_value_t = 1)]
        link_type: i32,
        /// 1 for a short link
        #[arg(long, default_value_t = 0)]
        short_link: i32,
    },
    /// Mini-program code image for a campaign and promotion slot
    MiniCode {
        #[arg(long)]
        act_id: i64,
        #[arg(long)]
        sid: String,
    },
    /// Quality score of promotion slots
    QualityScore {
        #[arg(long)]
        sid: Option<String>,
        #[command(flatten)]
        extras: Extras,
    },
    /// Cities of the union catalogue
    City {
        #[command(flatten)]
        extras: Extras,
    },
    /// Categories of the union catalogue
    Category {
        #[command(flatten)]
        extras: Extras,
    },
    /// Product list of the union catalogue
    Sku {
        #[command(flatten)]
        extras: Extras,
    },
    /// Cities with merchant data
    PoiCity {
        #[command(flatten)]
        extras: Extras,
    },
    /// Districts of a city
    PoiDistrict {
        #[arg(long)]
        city_id: i64,
        #[command(flatten)]
        extras: Extras,
    },
    /// Merchant categories of a city
    PoiCategory {
        #[arg(long)]
        city_id: i64,
        #[command(flatten)]
        extras: Extras,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct Extras {
    /// Additional request parameter, repeatable
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, Value)>,
}

impl Extras {
    fn into_params(self) -> Params {
        self.params.into_iter().collect()
    }
}

/// `key=value`; the value is sent as typed, leading zeros and signs included.
///
/// # Errors
/// Rejects input without `=` or with an empty key.
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    Ok((key.to_owned(), Value::String(value.to_owned())))
}

/// Decoded response plus what is worth reporting about the exchange.
#[derive(Debug, Clone, Serialize)]
pub struct Output {
    pub code: i64,
    pub message: String,
    pub trace_id: String,
    pub elapsed_ms: i64,
    pub response: Value,
}

impl Output {
    fn from_result<R: VendorResponse + Serialize>(result: &ApiResult<R>) -> Result<Self> {
        Ok(Self {
            code: result.result.code(),
            message: result.result.message().to_owned(),
            trace_id: result.http.trace_id.clone(),
            elapsed_ms: result.http.elapsed().num_milliseconds(),
            response: serde_json::to_value(&result.result)?,
        })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Run one endpoint.
///
/// # Errors
/// Propagates [`meituan_union::UnionError`] from the call; a vendor-reported
/// failure is an `Ok` output with a non-zero code.
pub async fn execute(client: &Client, command: ApiCommand) -> Result<Output> {
    tracing::debug!(?command, "executing");
    match command {
        ApiCommand::GenerateLink {
            act_id,
            sid,
            link_type,
            short_link,
        } => Output::from_result(
            &client
                .generate_link(act_id, &sid, link_type, short_link)
                .await?,
        ),
        ApiCommand::MiniCode { act_id, sid } => {
            Output::from_result(&client.mini_code(act_id, &sid).await?)
        }
        ApiCommand::QualityScore { sid, extras } => {
            let mut params = extras.into_params();
            if let Some(sid) = sid {
                params.set("sid", sid);
            }
            Output::from_result(&client.quality_score_by_sid(params).await?)
        }
        ApiCommand::City { extras } => {
            Output::from_result(&client.mt_union_city(extras.into_params()).await?)
        }
        ApiCommand::Category { extras } => {
            Output::from_result(&client.mt_union_category(extras.into_params()).await?)
        }
        ApiCommand::Sku { extras } => {
            Output::from_result(&client.mt_union_sku(extras.into_params()).await?)
        }
        ApiCommand::PoiCity { extras } => {
            Output::from_result(&client.poi_city(extras.into_params()).await?)
        }
        ApiCommand::PoiDistrict { city_id, extras } => Output::from_result(
            &client.poi_district(city_id, extras.into_params()).await?,
        ),
        ApiCommand::PoiCategory { city_id, extras } => Output::from_result(
            &client.poi_category(city_id, extras.into_params()).await?,
        ),
    }
}
