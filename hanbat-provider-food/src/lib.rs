//! Repository for restaurants using the municipal culture and tourism API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use hanbat_core::{
    model::{Category, FoodRecord, RawRecord, Scalar},
    plugin::SourcePlugin,
    ports::{FetchPage, PlacePort, PortError},
};

const BASE_URL: &str = "https://apis.data.go.kr/6300000/openapi2022/restrnt";
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
    items: Option<Vec<Restaurant>>,
}

/// Single restaurant from /getrestrnt
#[derive(Debug, Deserialize)]
struct Restaurant {
    #[serde(rename = "restrntIdx")]
    id: Option<String>,
    #[serde(rename = "restrntNm")]
    name: Option<String>,
    #[serde(rename = "restrntAddr")]
    address: Option<String>,
    #[serde(rename = "mapLat")]
    lat: Option<Scalar>,
    #[serde(rename = "mapLot")]
    lng: Option<Scalar>,
    #[serde(rename = "reprMenu")]
    menu: Option<String>,
    #[serde(rename = "telNo")]
    phone: Option<String>,
    #[serde(rename = "restrntSumm")]
    summary: Option<String>,
}

impl From<Restaurant> for RawRecord {
    fn from(restaurant: Restaurant) -> Self {
        Self::Food(FoodRecord {
            id: restaurant.id,
            name: restaurant.name,
            address: restaurant.address,
            lat: restaurant.lat,
            lng: restaurant.lng,
            menu: restaurant.menu,
            phone: restaurant.phone,
            summary: restaurant.summary,
        })
    }
}

/// Restaurant repository.
pub struct FoodPort {
    client: Client,
    service_key: String,
}

impl FoodPort {
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
impl PlacePort for FoodPort {
    fn category(&self) -> Category {
        Category::Food
    }

    async fn fetch(&self, page: u32, page_size: u32) -> Result<FetchPage, PortError> {
        if page_size == 0 {
            return Ok(FetchPage::ok(Vec::new()));
        }

        let page_no = page.max(1).to_string();
        let rows = page_size.to_string();
        let req = self.client.get(format!("{BASE_URL}/getrestrnt")).query(&[
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
            "Restaurant API answered {} {}",
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

/// Build the plugin bundle for the restaurant repository.
#[must_use]
pub fn plugin(client: Client, service_key: impl Into<String>) -> SourcePlugin {
    SourcePlugin::new(Arc::new(FoodPort::new(client, service_key)))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_restaurants_into_records() {
        let envelope: Envelope = serde_json::from_str(
            r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL SERVICE"},
            "body":{"items":[
              {"restrntNm":"성심당 본점","restrntAddr":"대전광역시 중구 대종로480번길 15",
               "mapLat":"36.3277","mapLot":"127.4273","reprMenu":"튀김소보로","telNo":"1588-8069"},
              {"restrntIdx":"R-2","restrntNm":"좌표없는 식당","mapLat":"","mapLot":null}
            ]}}}"#,
        )
        .expect("valid envelope");

        let page = into_page(envelope);

        assert!(page.success);
        assert_eq!(page.items.len(), 2);
        let Some(RawRecord::Food(first)) = page.items.first() else {
            panic!("expected a food record");
        };
        assert_eq!(first.id, None);
        assert_eq!(first.menu.as_deref(), Some("튀김소보로"));
        let Some(RawRecord::Food(second)) = page.items.get(1) else {
            panic!("expected a food record");
        };
        assert_eq!(second.lat, Some(Scalar::Text(String::new())));
        assert_eq!(second.lng, None);
    }

    #[test]
    fn error_code_reports_failure() {
        let envelope: Envelope = serde_json::from_str(
            r#"{"response":{"header":{"resultCode":"22","resultMsg":"LIMITED NUMBER OF SERVICE REQUESTS EXCEEDS ERROR"}}}"#,
        )
        .expect("valid envelope");

        assert!(!into_page(envelope).success);
    }
}
