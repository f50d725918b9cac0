//! Repository for parking lots using the municipal parking lot standard dataset.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use hanbat_core::{
    model::{Category, ParkingRecord, RawRecord, Scalar},
    plugin::SourcePlugin,
    ports::{FetchPage, PlacePort, PortError},
};

const BASE_URL: &str = "https://apis.data.go.kr/6300000/openapi2022/parkinglot";
const RESULT_OK: &str = "00";

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
    #[serde(default)]
    items: Option<Vec<ParkingLot>>,
}

/// Single lot from /getparkinglot, named after the national standard dataset
#[derive(Debug, Deserialize)]
struct ParkingLot {
    #[serde(rename = "prkplceNo")]
    id: Option<String>,
    #[serde(rename = "prkplceNm")]
    name: Option<String>,
    /// road-name address
    #[serde(rename = "rdnmadr")]
    road_address: Option<String>,
    /// lot-number address
    #[serde(rename = "lnmadr")]
    lot_address: Option<String>,
    #[serde(rename = "latitude")]
    lat: Option<Scalar>,
    #[serde(rename = "longitude")]
    lng: Option<Scalar>,
    #[serde(rename = "prkcmprt")]
    capacity: Option<Scalar>,
    #[serde(rename = "parkingchrgeInfo")]
    fee: Option<String>,
    #[serde(rename = "prkplceType")]
    lot_type: Option<String>,
}

impl From<ParkingLot> for RawRecord {
    fn from(lot: ParkingLot) -> Self {
        let address = lot
            .road_address
            .filter(|address| !address.trim().is_empty())
            .or(lot.lot_address);

        Self::Parking(ParkingRecord {
            id: lot.id,
            name: lot.name,
            address,
            lat: lot.lat,
            lng: lot.lng,
            capacity: lot.capacity.as_ref().and_then(parse_capacity),
            fee: lot.fee,
            lot_type: lot.lot_type,
        })
    }
}

/// Space counts arrive as numbers or as text such as "120".
fn parse_capacity(raw: &Scalar) -> Option<u32> {
    match raw {
        Scalar::Number(number) if number.is_finite() && *number >= 0.0 => {
            u32::try_from(number.round() as u64).ok()
        }
        Scalar::Number(_) => None,
        Scalar::Text(text) => text.trim().parse().ok(),
    }
}

/// Parking lot repository.
pub struct ParkingPort {
    client: Client,
    service_key: String,
}

impl ParkingPort {
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
impl PlacePort for ParkingPort {
    fn category(&self) -> Category {
        Category::Parking
    }

    async fn fetch(&self, page: u32, page_size: u32) -> Result<FetchPage, PortError> {
        if page_size == 0 {
            return Ok(FetchPage::ok(Vec::new()));
        }

        let page_no = page.max(1).to_string();
        let rows = page_size.to_string();
        let req = self
            .client
            .get(format!("{BASE_URL}/getparkinglot"))
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("pageNo", &page_no),
                ("numOfRows", &rows),
                ("type", "json"),
            ]);

        let envelope = fetch_json::<Envelope>(req).await?;
        Ok(into_page(envelope))
    }
}

fn into_page(envelope: Envelope) -> FetchPage {
    let Response { header, body } = envelope.response;
    if header.result_code != RESULT_OK {
        log::warn!(
            "Parking API answered {} {}",
            header.result_code,
            header.result_msg
        );
        return FetchPage::failed();
    }

    FetchPage::ok(
        body.and_then(|body| body.items)
            .unwrap_or_default()
            .into_iter()
            .map(RawRecord::from)
            .collect(),
    )
}

/// Build the plugin bundle for the parking repository.
#[must_use]
pub fn plugin(client: Client, service_key: impl Into<String>) -> SourcePlugin {
    SourcePlugin::new(Arc::new(ParkingPort::new(client, service_key)))
}

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
