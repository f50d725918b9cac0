//! Repository for tourist attractions using the municipal culture and tourism API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use hanbat_core::{
    model::{Category, RawRecord, Scalar, TourRecord},
    plugin::SourcePlugin,
    ports::{FetchPage, PlacePort, PortError},
};

const BASE_URL: &str = "https://apis.data.go.kr/6300000/openapi2022/tourspot";
const RESULT_OK: &str = "00";

/// Envelope shared by the open-data endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    response: Response,
}

#[derive(Debug, Deserialize)]
struct Response {
    header: Header,
    #[serde(default)]
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "resultMsg", default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct Body {
    // null when the page is past the end
    #[serde(default)]
    items: Option<Vec<TourSpot>>,
}

/// Single attraction from /gettourspot
#[derive(Debug, Deserialize)]
struct TourSpot {
    #[serde(rename = "tourspotIdx")]
    id: Option<String>,
    #[serde(rename = "tourspotNm")]
    name: Option<String>,
    #[serde(rename = "tourspotAddr")]
    address: Option<String>,
    #[serde(rename = "tourspotDtlAddr")]
    detail_address: Option<String>,
    #[serde(rename = "mapLat")]
    lat: Option<Scalar>,
    #[serde(rename = "mapLot")]
    lng: Option<Scalar>,
    #[serde(rename = "tourspotSumm")]
    summary: Option<String>,
    #[serde(rename = "refadNo")]
    phone: Option<String>,
}

impl From<TourSpot> for RawRecord {
    fn from(spot: TourSpot) -> Self {
        Self::Tour(TourRecord {
            id: spot.id,
            name: spot.name,
            address: spot.address,
            detail_address: spot.detail_address,
            lat: spot.lat,
            lng: spot.lng,
            summary: spot.summary,
            phone: spot.phone,
        })
    }
}

/// Attraction repository.
pub struct TourPort {
    client: Client,
    service_key: String,
}

impl TourPort {
    /// Create a new port bound to the given HTTP client and open-data service key.
    #[must_use]
    pub fn new(client: Client, service_key: impl Into<String>) -> Self {
        Self {
            client,
            service_key: service_key.into(),
        }
    }
}

#[async_trait]
impl PlacePort for TourPort {
    fn category(&self) -> Category {
        Category::Tour
    }

    async fn fetch(&self, page: u32, page_size: u32) -> Result<FetchPage, PortError> {
        if page_size == 0 {
            return Ok(FetchPage::ok(Vec::new()));
        }

        let page_no = page.max(1).to_string();
        let rows = page_size.to_string();
        let req = self.client.get(format!("{BASE_URL}/gettourspot")).query(&[
            ("serviceKey", self.service_key.as_str()),
            ("pageNo", &page_no),
            ("numOfRows", &rows),
        ]);

        let envelope = fetch_json::<Envelope>(req).await?;
        Ok(into_page(envelope))
    }
}

fn into_page(envelope: Envelope) -> FetchPage {
    let Response { header, body } = envelope.response;
    if header.result_code != RESULT_OK {
        log::warn!(
            "Tour API answered {} {}",
            header.result_code,
            header.result_msg
        );
        return FetchPage::failed();
    }

    let items = body
        .and_then(|body| body.items)
        .unwrap_or_default()
        .into_iter()
        .map(RawRecord::from)
        .collect();
    FetchPage::ok(items)
}

/// Build the plugin bundle for the attraction repository.
#[must_use]
pub fn plugin(client: Client, service_key: impl Into<String>) -> SourcePlugin {
    SourcePlugin::new(Arc::new(TourPort::new(client, service_key)))
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
