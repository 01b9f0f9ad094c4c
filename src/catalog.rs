use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Visits,
    Hits,
}

impl ReportType {
    pub fn prefix(self) -> &'static str {
        match self {
            ReportType::Visits => "ym:s:",
            ReportType::Hits => "ym:pv:",
        }
    }

    /// Value of the `source` query parameter.
    pub fn source(self) -> &'static str {
        match self {
            ReportType::Visits => "visits",
            ReportType::Hits => "hits",
        }
    }

    fn other(self) -> ReportType {
        match self {
            ReportType::Visits => ReportType::Hits,
            ReportType::Hits => ReportType::Visits,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// Which traffic-source touchpoint is credited for a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Attribution {
    #[default]
    Last,
    First,
    LastSignificant,
    LastYandexDirect,
    FirstYandexDirect,
}

impl Attribution {
    pub const ALL: [Attribution; 5] = [
        Attribution::Last,
        Attribution::First,
        Attribution::LastSignificant,
        Attribution::LastYandexDirect,
        Attribution::FirstYandexDirect,
    ];

    /// Token sent to the API and substituted for `<attribution>` in field names.
    pub fn token(self) -> &'static str {
        match self {
            Attribution::Last => "last",
            Attribution::First => "first",
            Attribution::LastSignificant => "last_significant",
            Attribution::LastYandexDirect => "last_yandex_direct",
            Attribution::FirstYandexDirect => "first_yandex_direct",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Attribution::Last => "Last click",
            Attribution::First => "First click",
            Attribution::LastSignificant => "Last significant click",
            Attribution::LastYandexDirect => "Last click from Yandex Direct",
            Attribution::FirstYandexDirect => "First click from Yandex Direct",
        }
    }
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Placeholder the API expands according to the request's attribution model.
pub const ATTRIBUTION_PLACEHOLDER: &str = "<attribution>";

#[rustfmt::skip]
pub const VISITS_METRICS: &[&str] = &[
    // visit
    "ym:s:visitID", "ym:s:counterID", "ym:s:watchIDs", "ym:s:date", "ym:s:dateTime",
    "ym:s:dateTimeUTC", "ym:s:isNewUser", "ym:s:startURL", "ym:s:endURL",
    "ym:s:pageViews", "ym:s:visitDuration", "ym:s:bounce", "ym:s:ipAddress",
    // geo
    "ym:s:regionCountry", "ym:s:regionCity", "ym:s:regionCountryID",
    "ym:s:regionCityID",
    // user
    "ym:s:clientID", "ym:s:counterUserIDHash", "ym:s:networkType",
    // goals
    "ym:s:goalsID", "ym:s:goalsSerialNumber", "ym:s:goalsDateTime",
    "ym:s:goalsPrice", "ym:s:goalsOrder", "ym:s:goalsCurrency",
    // traffic sources
    "ym:s:<attribution>TrafficSource", "ym:s:<attribution>AdvEngine",
    "ym:s:<attribution>ReferalSource", "ym:s:<attribution>SearchEngineRoot",
    "ym:s:<attribution>SearchEngine", "ym:s:<attribution>SocialNetwork",
    "ym:s:<attribution>SocialNetworkProfile", "ym:s:referer",
    // direct
    "ym:s:<attribution>DirectClickOrder", "ym:s:<attribution>DirectBannerGroup",
    "ym:s:<attribution>DirectClickBanner", "ym:s:<attribution>DirectClickOrderName",
    "ym:s:<attribution>ClickBannerGroupName", "ym:s:<attribution>DirectClickBannerName",
    "ym:s:<attribution>DirectPhraseOrCond", "ym:s:<attribution>DirectPlatformType",
    "ym:s:<attribution>DirectPlatform", "ym:s:<attribution>DirectConditionType",
    "ym:s:<attribution>CurrencyID",
    // ad tags
    "ym:s:from", "ym:s:<attribution>UTMCampaign", "ym:s:<attribution>UTMContent",
    "ym:s:<attribution>UTMMedium", "ym:s:<attribution>UTMSource", "ym:s:<attribution>UTMTerm",
    "ym:s:<attribution>openstatAd", "ym:s:<attribution>openstatCampaign",
    "ym:s:<attribution>openstatService", "ym:s:<attribution>openstatSource",
    "ym:s:<attribution>hasGCLID", "ym:s:<attribution>GCLID",
    // browser and device
    "ym:s:browserLanguage", "ym:s:browserCountry", "ym:s:clientTimeZone",
    "ym:s:deviceCategory", "ym:s:mobilePhone", "ym:s:mobilePhoneModel",
    "ym:s:operatingSystemRoot", "ym:s:operatingSystem", "ym:s:browser",
    "ym:s:browserMajorVersion", "ym:s:browserMinorVersion", "ym:s:browserEngine",
    "ym:s:browserEngineVersion1", "ym:s:browserEngineVersion2",
    "ym:s:browserEngineVersion3", "ym:s:browserEngineVersion4",
    "ym:s:cookieEnabled", "ym:s:javascriptEnabled",
    // screen
    "ym:s:screenFormat", "ym:s:screenColors", "ym:s:screenOrientation",
    "ym:s:screenOrientationName", "ym:s:screenWidth", "ym:s:screenHeight",
    "ym:s:physicalScreenWidth", "ym:s:physicalScreenHeight",
    "ym:s:windowClientWidth", "ym:s:windowClientHeight",
    // ecommerce
    "ym:s:purchaseID", "ym:s:purchaseDateTime", "ym:s:purchaseAffiliation",
    "ym:s:purchaseRevenue", "ym:s:purchaseTax", "ym:s:purchaseShipping",
    "ym:s:purchaseCoupon", "ym:s:purchaseCurrency", "ym:s:purchaseProductQuantity",
    // product events
    "ym:s:eventsProductID", "ym:s:eventsProductList", "ym:s:eventsProductBrand",
    "ym:s:eventsProductCategory", "ym:s:eventsProductCategory1",
    "ym:s:eventsProductCategory2", "ym:s:eventsProductCategory3",
    "ym:s:eventsProductCategory4", "ym:s:eventsProductCategory5",
    "ym:s:eventsProductVariant", "ym:s:eventsProductPosition",
    "ym:s:eventsProductPrice", "ym:s:eventsProductCurrency",
    "ym:s:eventsProductCoupon", "ym:s:eventsProductQuantity",
    "ym:s:eventsProductEventTime", "ym:s:eventsProductType",
    "ym:s:eventsProductDiscount", "ym:s:eventsProductName",
    // purchased products
    "ym:s:productsPurchaseID", "ym:s:productsID", "ym:s:productsName",
    "ym:s:productsBrand", "ym:s:productsCategory", "ym:s:productsCategory1",
    "ym:s:productsCategory2", "ym:s:productsCategory3", "ym:s:productsCategory4",
    "ym:s:productsCategory5", "ym:s:productsVariant", "ym:s:productsPosition",
    "ym:s:productsPrice", "ym:s:productsCurrency", "ym:s:productsCoupon",
    "ym:s:productsQuantity", "ym:s:productsList", "ym:s:productsEventTime",
    "ym:s:productsDiscount",
    // impressions
    "ym:s:impressionsURL", "ym:s:impressionsDateTime", "ym:s:impressionsProductID",
    "ym:s:impressionsProductName", "ym:s:impressionsProductBrand",
    "ym:s:impressionsProductCategory", "ym:s:impressionsProductCategory1",
    "ym:s:impressionsProductCategory2", "ym:s:impressionsProductCategory3",
    "ym:s:impressionsProductCategory4", "ym:s:impressionsProductCategory5",
    "ym:s:impressionsProductVariant", "ym:s:impressionsProductPrice",
    "ym:s:impressionsProductCurrency", "ym:s:impressionsProductCoupon",
    "ym:s:impressionsProductList", "ym:s:impressionsProductQuantity",
    "ym:s:impressionsProductEventTime", "ym:s:impressionsProductDiscount",
    // promotions
    "ym:s:promotionID", "ym:s:promotionName", "ym:s:promotionCreative",
    "ym:s:promotionPosition", "ym:s:promotionCreativeSlot",
    "ym:s:promotionEventTime", "ym:s:promotionType",
    // offline calls
    "ym:s:offlineCallTalkDuration", "ym:s:offlineCallHoldDuration",
    "ym:s:offlineCallMissed", "ym:s:offlineCallTag",
    "ym:s:offlineCallFirstTimeCaller", "ym:s:offlineCallURL",
    // visit params
    "ym:s:parsedParamsKey1", "ym:s:parsedParamsKey2", "ym:s:parsedParamsKey3",
    "ym:s:parsedParamsKey4", "ym:s:parsedParamsKey5", "ym:s:parsedParamsKey6",
    "ym:s:parsedParamsKey7", "ym:s:parsedParamsKey8", "ym:s:parsedParamsKey9",
    "ym:s:parsedParamsKey10",
    "ym:s:<attribution>RecommendationSystem", "ym:s:<attribution>Messenger",
];

#[rustfmt::skip]
pub const HITS_METRICS: &[&str] = &[
    // hit
    "ym:pv:date", "ym:pv:dateTime", "ym:pv:clientID", "ym:pv:watchID",
    "ym:pv:counterID", "ym:pv:title", "ym:pv:URL", "ym:pv:referer",
    // page
    "ym:pv:browserLanguage", "ym:pv:browserCountry", "ym:pv:regionCountry",
    "ym:pv:regionCity", "ym:pv:pageCharset", "ym:pv:pageHeight", "ym:pv:pageWidth",
    "ym:pv:pagePath", "ym:pv:pageQuery", "ym:pv:shareService", "ym:pv:shareTitle",
    "ym:pv:shareURL", "ym:pv:viewportHeight", "ym:pv:viewportWidth",
    // device
    "ym:pv:deviceCategory", "ym:pv:deviceBrand", "ym:pv:deviceModel",
    "ym:pv:deviceModelVersion", "ym:pv:operatingSystem", "ym:pv:browser",
    "ym:pv:browserVersion", "ym:pv:browserMajorVersion", "ym:pv:browserEngine",
    "ym:pv:cookieEnabled", "ym:pv:javascriptEnabled", "ym:pv:flashMajor",
    "ym:pv:flashMinor", "ym:pv:screenFormat", "ym:pv:screenColors",
    "ym:pv:screenOrientation", "ym:pv:screenWidth", "ym:pv:screenHeight",
    "ym:pv:physicalScreenWidth", "ym:pv:physicalScreenHeight",
    // ad tags
    "ym:pv:visitID", "ym:pv:UTMCampaign", "ym:pv:UTMContent", "ym:pv:UTMMedium",
    "ym:pv:UTMSource", "ym:pv:UTMTerm", "ym:pv:openstatAd", "ym:pv:openstatCampaign",
    "ym:pv:openstatService", "ym:pv:openstatSource", "ym:pv:hasGCLID",
    "ym:pv:GCLID", "ym:pv:from", "ym:pv:YMCLID",
    // events and goals
    "ym:pv:eventType", "ym:pv:eventCategory", "ym:pv:eventAction",
    "ym:pv:eventLabel", "ym:pv:eventValue", "ym:pv:goalsID",
    // interaction
    "ym:pv:link", "ym:pv:download", "ym:pv:notBounce", "ym:pv:lastTrafficSource",
    "ym:pv:lastSearchEngine", "ym:pv:lastSearchEngineRoot", "ym:pv:lastAdvEngine",
    "ym:pv:artificial", "ym:pv:pageUrlHash", "ym:pv:lastSocialNetwork",
    // load
    "ym:pv:loadReachGoal", "ym:pv:loadRegion", "ym:pv:loadOrderAmount",
    "ym:pv:startLayerLoadTime", "ym:pv:userClientID", "ym:pv:networkType",
    // direct
    "ym:pv:lastDirectClickOrder", "ym:pv:lastDirectBannerGroup",
    "ym:pv:lastDirectClickBanner", "ym:pv:lastDirectPhraseOrCond",
    "ym:pv:lastDirectPlatformType", "ym:pv:lastDirectOrderID",
    "ym:pv:lastDirectClickPageRef", "ym:pv:lastClickBannerGroupName",
    "ym:pv:lastClickBannerGroupOrder", "ym:pv:lastClickBannerName",
    "ym:pv:lastClickBannerState", "ym:pv:lastClickOrderID",
    "ym:pv:lastClickOrderName", "ym:pv:lastClickPageNum",
    "ym:pv:lastClickResourceID", "ym:pv:lastDirectAdID",
    "ym:pv:lastDirectClickBannerID", "ym:pv:lastDirectClickOrderName",
    "ym:pv:lastDirectClickResourceID", "ym:pv:lastDirectCondID",
    "ym:pv:lastDirectSource",
    // parsed params
    "ym:pv:parsedParamsKey1", "ym:pv:parsedParamsKey2", "ym:pv:parsedParamsKey3",
    "ym:pv:parsedParamsKey4", "ym:pv:parsedParamsKey5", "ym:pv:parsedParamsKey6",
    "ym:pv:parsedParamsKey7", "ym:pv:parsedParamsKey8", "ym:pv:parsedParamsKey9",
    "ym:pv:parsedParamsKey10",
    "ym:pv:params", "ym:pv:paramsLevel1", "ym:pv:paramsLevel2",
    "ym:pv:paramsLevel3", "ym:pv:paramsLevel4", "ym:pv:paramsLevel5",
    "ym:pv:paramsLevel6", "ym:pv:paramsLevel7", "ym:pv:paramsLevel8",
];

pub fn available_metrics(report_type: ReportType) -> &'static [&'static str] {
    let metrics = match report_type {
        ReportType::Visits => VISITS_METRICS,
        ReportType::Hits => HITS_METRICS,
    };
    debug!("available metrics for {report_type}: {}", metrics.len());
    metrics
}

/// Checks that `fields` come from a single prefix family and are all known.
///
/// Returns the effective report type: when every field belongs to the other
/// family than `requested`, the report type follows the fields.
pub fn validate_fields<S: AsRef<str>>(
    fields: &[S],
    requested: ReportType,
) -> Result<ReportType, ValidationError> {
    if fields.is_empty() {
        return Err(ValidationError::EmptyFields);
    }

    let has_visits = fields
        .iter()
        .any(|f| f.as_ref().starts_with(ReportType::Visits.prefix()));
    let has_hits = fields
        .iter()
        .any(|f| f.as_ref().starts_with(ReportType::Hits.prefix()));

    if has_visits && has_hits {
        return Err(ValidationError::MixedFamilies);
    }

    let mut effective = requested;
    let switched = (has_visits && requested == ReportType::Hits)
        || (has_hits && requested == ReportType::Visits);
    if switched {
        effective = requested.other();
        warn!("changing report type from {requested} to {effective} based on metric prefixes");
    }

    let available = available_metrics(effective);
    let unknown: Vec<String> = fields
        .iter()
        .map(|f| f.as_ref())
        .filter(|f| !available.contains(f))
        .map(str::to_string)
        .collect();

    if !unknown.is_empty() {
        return Err(ValidationError::UnknownMetrics {
            report_type: effective.to_string(),
            fields: unknown,
        });
    }

    Ok(effective)
}

/// Prepends the family's `date` and `clientID` fields when they are missing.
pub fn with_required_metrics(report_type: ReportType, mut fields: Vec<String>) -> Vec<String> {
    for name in ["clientID", "date"] {
        let field = format!("{}{name}", report_type.prefix());
        if !fields.contains(&field) {
            fields.insert(0, field);
        }
    }
    fields
}

/// Removes the report-family prefix from a raw field name.
pub fn strip_prefix(field: &str) -> &str {
    field
        .strip_prefix(ReportType::Visits.prefix())
        .or_else(|| field.strip_prefix(ReportType::Hits.prefix()))
        .unwrap_or(field)
}
