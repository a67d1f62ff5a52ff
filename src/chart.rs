//! Natal chart API client
//!
//! Posts the birth facts to the chart service and turns the planet table of
//! the response into one sentence per body, in the order the service lists
//! them.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::ChartConfig;
use crate::error::{NatalError, Result};

/// Sun through Pluto
const PLANETS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// Anything that can produce a natal summary for a birth moment and place
#[async_trait::async_trait]
pub trait ChartSource: Send + Sync {
    /// `birthday` is "YYYY-MM-DD HH:MM"; `coordinate` is (longitude, latitude)
    async fn natal(&self, birthday: &str, coordinate: (f64, f64)) -> Result<Vec<String>>;
}

#[derive(Debug, Serialize)]
struct ChartRequest<'a> {
    access_token: &'a str,
    birthday: &'a str,
    h_sys: &'a str,
    latitude: String,
    longitude: String,
    planets: &'static [&'static str],
    planet_xs: &'static [&'static str],
    planet_xf: &'static [&'static str],
    #[serde(rename = "virtual")]
    virtual_points: &'static [&'static str],
    phase: BTreeMap<&'static str, f64>,
    tz: &'a str,
    svg_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub data: Option<ChartData>,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartData {
    pub planet: Vec<PlanetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PlanetEntry {
    pub planet_chinese: String,
    pub sign: SignInfo,
}

#[derive(Debug, Deserialize)]
pub struct SignInfo {
    pub sign_chinese: String,
}

impl PlanetEntry {
    pub fn sentence(&self) -> String {
        format!("{}落在{}座", self.planet_chinese, self.sign.sign_chinese)
    }
}

/// One "<body>落在<sign>座" line per planet entry
pub fn planet_sentences(response: &ChartResponse) -> Result<Vec<String>> {
    let data = response.data.as_ref().ok_or_else(|| {
        NatalError::ChartResponse(
            response
                .msg
                .clone()
                .unwrap_or_else(|| "response has no data field".to_string()),
        )
    })?;
    Ok(data.planet.iter().map(PlanetEntry::sentence).collect())
}

/// Strictly decode a response body and extract the sentences
pub fn parse_natal(body: &str) -> Result<Vec<String>> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| NatalError::ChartResponse(format!("malformed chart response: {}", e)))?;
    planet_sentences(&response)
}

/// Client for the xingpan natal chart endpoint
pub struct XingpanClient {
    client: Client,
    endpoint: String,
    access_token: String,
    tz: String,
    house_system: String,
}

impl XingpanClient {
    pub fn new(config: &ChartConfig, access_token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            access_token,
            tz: config.tz.clone(),
            house_system: config.house_system.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ChartSource for XingpanClient {
    async fn natal(&self, birthday: &str, coordinate: (f64, f64)) -> Result<Vec<String>> {
        let (longitude, latitude) = coordinate;
        let request = ChartRequest {
            access_token: &self.access_token,
            birthday,
            h_sys: &self.house_system,
            // Debug keeps the fractional part of whole degrees ("120.0")
            latitude: format!("{:?}", latitude),
            longitude: format!("{:?}", longitude),
            planets: &PLANETS,
            planet_xs: &["433"],
            planet_xf: &["Regulus"],
            virtual_points: &["10"],
            phase: BTreeMap::from([("0", 0.5), ("30", 0.5)]),
            tz: &self.tz,
            svg_type: "-1",
        };

        tracing::debug!("Requesting natal chart for {} at {:?}", birthday, coordinate);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json;charset=UTF-8")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NatalError::Status {
                service: "chart API".to_string(),
                status,
            });
        }

        let body = response.text().await?;
        parse_natal(&body)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const TWO_PLANETS: &str = r#"{
        "code": 0,
        "msg": "ok",
        "data": {
            "planet": [
                {"planet_chinese": "太阳", "planet_english": "Sun", "sign": {"sign_chinese": "摩羯", "sign_english": "Capricorn"}},
                {"planet_chinese": "月亮", "planet_english": "Moon", "sign": {"sign_chinese": "白羊", "sign_english": "Aries"}}
            ]
        }
    }"#;

    /// Serve exactly one HTTP response and hand back the raw request body
    pub(crate) async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/natal", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let request_body = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending a full request");
                buf.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    let body_start = header_end + 4;
                    if buf.len() >= body_start + content_length {
                        break String::from_utf8_lossy(&buf[body_start..body_start + content_length])
                            .to_string();
                    }
                }
            };

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request_body
        });

        (url, handle)
    }

    fn test_config(endpoint: String) -> ChartConfig {
        ChartConfig {
            endpoint,
            access_token: "$XINGPAN_ACCESS_TOKEN".to_string(),
            timeout_secs: 5,
            tz: "8.00".to_string(),
            house_system: "P".to_string(),
        }
    }

    #[test]
    fn test_two_planets_in_order() {
        let sentences = parse_natal(TWO_PLANETS).unwrap();

        assert_eq!(sentences, vec!["太阳落在摩羯座", "月亮落在白羊座"]);
    }

    #[test]
    fn test_empty_planet_table() {
        let sentences = parse_natal(r#"{"data": {"planet": []}}"#).unwrap();

        assert!(sentences.is_empty());
    }

    #[test]
    fn test_missing_data_surfaces_message() {
        match parse_natal(r#"{"code": 1001, "msg": "access_token无效"}"#) {
            Err(NatalError::ChartResponse(msg)) => assert_eq!(msg, "access_token无效"),
            other => panic!("expected ChartResponse error, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_syntax_is_rejected() {
        // Single quotes and a trailing comma are not JSON
        let body = "{'data': {'planet': [{'planet_chinese': '太阳', 'sign': {'sign_chinese': '摩羯'}},]}}";

        assert!(matches!(parse_natal(body), Err(NatalError::ChartResponse(_))));
    }

    #[test]
    fn test_entry_missing_sign_is_rejected() {
        let body = r#"{"data": {"planet": [{"planet_chinese": "太阳"}]}}"#;

        assert!(parse_natal(body).is_err());
    }

    #[tokio::test]
    async fn test_request_body_and_response() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", TWO_PLANETS).await;
        let client = XingpanClient::new(&test_config(url), "token-123".to_string()).unwrap();

        let sentences = client.natal("1990-01-01 12:00", (121.47, 31.23)).await.unwrap();
        assert_eq!(sentences, vec!["太阳落在摩羯座", "月亮落在白羊座"]);

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["access_token"], "token-123");
        assert_eq!(sent["birthday"], "1990-01-01 12:00");
        assert_eq!(sent["h_sys"], "P");
        assert_eq!(sent["longitude"], "121.47");
        assert_eq!(sent["latitude"], "31.23");
        assert_eq!(sent["planets"].as_array().unwrap().len(), 10);
        assert_eq!(sent["planet_xs"][0], "433");
        assert_eq!(sent["planet_xf"][0], "Regulus");
        assert_eq!(sent["virtual"][0], "10");
        assert_eq!(sent["phase"]["0"], 0.5);
        assert_eq!(sent["phase"]["30"], 0.5);
        assert_eq!(sent["tz"], "8.00");
        assert_eq!(sent["svg_type"], "-1");
    }

    #[tokio::test]
    async fn test_whole_degrees_keep_decimal_point() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", TWO_PLANETS).await;
        let client = XingpanClient::new(&test_config(url), "token".to_string()).unwrap();

        client.natal("1990-01-01 12:00", (120.0, 30.0)).await.unwrap();

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["longitude"], "120.0");
        assert_eq!(sent["latitude"], "30.0");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let (url, server) = serve_once("HTTP/1.1 502 Bad Gateway", "{}").await;
        let client = XingpanClient::new(&test_config(url), "token".to_string()).unwrap();

        let result = client.natal("1990-01-01 12:00", (121.47, 31.23)).await;
        match result {
            Err(NatalError::Status { status, .. }) => assert_eq!(status.as_u16(), 502),
            other => panic!("expected Status error, got {:?}", other),
        }
        server.await.unwrap();
    }
}
