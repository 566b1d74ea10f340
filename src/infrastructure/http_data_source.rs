// HTTP data source - posts load descriptors to the shipboard data endpoints
use crate::application::data_source::{
    DataSource, HovmollerRequest, HovmollerResponse, TimeseriesRequest, TimeseriesResponse,
};
use crate::error::TransportError;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    hovmoller_url: String,
    timeseries_url: String,
}

impl HttpDataSource {
    pub fn new(hovmoller_url: String, timeseries_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            hovmoller_url,
            timeseries_url,
        }
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, url: &str, body: &B) -> Result<R, TransportError> {
        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        // the endpoints do not always label their JSON, so decode the text ourselves
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn load_hovmoller(&self, request: &HovmollerRequest) -> Result<HovmollerResponse, TransportError> {
        tracing::debug!("POST {}", self.hovmoller_url);
        self.post(&self.hovmoller_url, request).await
    }

    async fn load_timeseries(&self, request: &TimeseriesRequest) -> Result<TimeseriesResponse, TransportError> {
        tracing::debug!("POST {}", self.timeseries_url);
        self.post(&self.timeseries_url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn timeseries_request() -> TimeseriesRequest {
        TimeseriesRequest {
            independent_variable: "Time".into(),
            data_1: "PE Salinity".into(),
            data_2: "None".into(),
            data_3: "None".into(),
            data_4: "None".into(),
            start_time: "2020-06-26T10:00".into(),
            end_time: "2020-06-26T12:00".into(),
            time_resolution: 5,
        }
    }

    #[tokio::test]
    async fn test_posts_descriptor_and_decodes_columns() {
        let router = Router::new().route(
            "/timeseries",
            post(|Json(body): Json<Value>| async move {
                // echo one field back so the test sees what was sent
                (
                    StatusCode::OK,
                    json!({
                        "Pelican_independent_values": [body["start_time"].clone()],
                        "PointSur_independent_values": [],
                        "data_values_1": ["33.10"],
                        "data_values_2": [],
                        "data_values_3": [],
                        "data_values_4": []
                    })
                    .to_string(),
                )
            }),
        );
        let base = serve(router).await;
        let source = HttpDataSource::new(format!("{}/hovmoller", base), format!("{}/timeseries", base));

        let response = source.load_timeseries(&timeseries_request()).await.unwrap();
        assert_eq!(response.pelican_independent, Some(vec![json!("2020-06-26T10:00")]));
        assert_eq!(response.data_1, Some(vec![json!("33.10")]));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_a_transport_error() {
        let router = Router::new().route(
            "/hovmoller",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database down") }),
        );
        let base = serve(router).await;
        let source = HttpDataSource::new(format!("{}/hovmoller", base), format!("{}/timeseries", base));

        let request = HovmollerRequest {
            x_variable: "Longitude".into(),
            y_variable: "Latitude".into(),
            data_pe: "Salinity".into(),
            data_ps: "None".into(),
            start_time: "2020-06-26T08:00".into(),
            end_time: "2020-06-26T12:00".into(),
            time_resolution: 1,
        };
        let err = source.load_hovmoller(&request).await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 500, ref body } if body == "database down"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_decode_error() {
        let router = Router::new().route("/timeseries", post(|| async { "<html>oops</html>" }));
        let base = serve(router).await;
        let source = HttpDataSource::new(format!("{}/hovmoller", base), format!("{}/timeseries", base));

        let err = source.load_timeseries(&timeseries_request()).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }
}
