//! Backend client.
//!
//! Everything the forms need from the backend goes through [`Api`], which turns typed calls into
//! [`Request`]s and hands them to a [`Transport`]. [`HttpTransport`] talks to the real backend;
//! tests substitute their own transport.
use crate::{
    model::{EatenRecord, Edible, EdibleKind, FoodSubmission, Nutrient, NutrientMap, RecipeSubmission, Unit, Weight},
    Error,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, rc::Rc};
use tracing::{debug, warn};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A request to the backend: a method, a path, query parameters and an optional JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Request {
        Request {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Request {
        Request {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Appends a query parameter.
    pub fn param(mut self, key: &str, value: impl ToString) -> Request {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    /// A 200 response with the given body.
    pub fn ok(body: Value) -> Response {
        Response { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request/response exchange with the backend.
#[async_trait(?Send)]
pub trait Transport {
    async fn exchange(&self, request: Request) -> Result<Response, Error>;
}

/// Time span of consumer totals.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DayRange {
    Between { start: DateTime<Utc>, end: DateTime<Utc> },
    On(NaiveDate),
}

#[derive(Deserialize)]
struct SearchResults {
    results: Vec<Edible>,
}

#[derive(Deserialize)]
struct WeightOptions {
    weights: Vec<Unit>,
}

/// Typed client of the backend.
#[derive(Clone)]
pub struct Api {
    transport: Rc<dyn Transport>,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Api")
    }
}

impl Api {
    pub fn new(transport: Rc<dyn Transport>) -> Api {
        Api { transport }
    }

    /// Sends a request; non-success statuses are errors.
    pub async fn send(&self, request: Request) -> Result<Response, Error> {
        let method = request.method;
        let path = request.path.clone();
        debug!(%method, %path, "sending request");
        let response = self.transport.exchange(request).await?;
        if !response.is_success() {
            warn!(%method, %path, status = response.status, "request rejected");
            return Err(Error::Status {
                method,
                path,
                status: response.status,
            });
        }
        Ok(response)
    }

    async fn get_json<R: DeserializeOwned>(&self, request: Request) -> Result<R, Error> {
        let response = self.send(request).await?;
        Ok(serde_json::from_value(response.body)?)
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, Error> {
        let body = serde_json::to_value(body)?;
        self.send(Request::post(path, body)).await
    }

    /// Searches edibles by name, optionally only foods or only recipes.
    pub async fn search(&self, text: &str, restrict_to: Option<EdibleKind>) -> Result<Vec<Edible>, Error> {
        let mut request = Request::get("/search").param("for", text);
        if let Some(kind) = restrict_to {
            request = request.param("restrictTo", kind);
        }
        let results: SearchResults = self.get_json(request).await?;
        Ok(results.results)
    }

    /// Weight options of a food, starting with the gram unit.
    pub async fn food_weights(&self, food_id: i64) -> Result<Vec<Unit>, Error> {
        let options: WeightOptions = self.get_json(Request::get(format!("/food/{food_id}/weights"))).await?;
        let mut weights = Vec::with_capacity(options.weights.len() + 1);
        weights.push(Unit::gram());
        weights.extend(options.weights);
        Ok(weights)
    }

    /// Nutrients in the given quantity of an edible.
    ///
    /// Resolves to an empty map without a request if the amount is not strictly positive.
    pub async fn nutrients(&self, edible: &Edible, weight: &Weight) -> Result<NutrientMap, Error> {
        let Some(amount) = weight.positive_amount() else {
            return Ok(NutrientMap::new());
        };
        let request = Request::get("/macros")
            .param("id", edible.id)
            .param("type", edible.kind)
            .param("amount", amount)
            .param("seq_num", weight.seq_num);
        self.get_json(request).await
    }

    /// Nutrients eaten by a consumer over a time span.
    pub async fn consumer_totals(&self, consumer: &str, range: DayRange) -> Result<NutrientMap, Error> {
        let request = Request::get("/eat").param("consumer", consumer);
        let request = match range {
            DayRange::Between { start, end } => request
                .param("start", start.to_rfc3339_opts(SecondsFormat::Millis, true))
                .param("end", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
            DayRange::On(date) => request.param("date", date.format("%Y-%m-%d")),
        };
        self.get_json(request).await
    }

    pub async fn search_nutrients(&self, text: &str) -> Result<Vec<Nutrient>, Error> {
        self.get_json(Request::get("/nutrients").param("search", text)).await
    }

    pub async fn record_eaten(&self, record: &EatenRecord) -> Result<(), Error> {
        self.post_json("/eat", record).await?;
        Ok(())
    }

    /// Creates or updates a food. Returns the record echoed by the backend.
    pub async fn create_food(&self, submission: &FoodSubmission) -> Result<Value, Error> {
        Ok(self.post_json("/food", submission).await?.body)
    }

    pub async fn create_recipe(&self, submission: &RecipeSubmission) -> Result<(), Error> {
        self.post_json("/recipes", submission).await?;
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------

/// Transport over HTTP.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<HttpTransport, Error> {
        let mut url = reqwest::Url::parse(base_url).map_err(|err| Error::Url(format!("{base_url}: {err}")))?;
        if url.cannot_be_a_base() {
            return Err(Error::Url(base_url.to_string()));
        }
        // paths are resolved relative to the base
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(HttpTransport {
            client: reqwest::Client::new(),
            base_url: url,
        })
    }

    pub fn url_for(&self, request: &Request) -> Result<reqwest::Url, Error> {
        let mut url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|err| Error::Url(format!("{}: {err}", request.path)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn exchange(&self, request: Request) -> Result<Response, Error> {
        let url = self.url_for(&request)?;
        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = match serde_json::from_slice(&bytes) {
            Ok(body) => body,
            // error pages and empty bodies carry no JSON
            Err(_) if bytes.is_empty() || !(200..300).contains(&status) => Value::Null,
            Err(err) => return Err(err.into()),
        };
        Ok(Response { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_keep_base_path_and_encode_query() {
        let transport = HttpTransport::new("http://localhost:5000/api").unwrap();
        let url = transport
            .url_for(&Request::get("/search").param("for", "apple pie").param("restrictTo", "food"))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/search?for=apple+pie&restrictTo=food");

        let url = transport.url_for(&Request::get("/food/2/weights")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/food/2/weights");
    }

    #[test]
    fn rejects_invalid_base_urls() {
        assert!(matches!(HttpTransport::new("not a url"), Err(Error::Url(_))));
        assert!(matches!(HttpTransport::new("mailto:someone@example.com"), Err(Error::Url(_))));
    }

    #[test]
    fn query_params() {
        let request = Request::get("/macros").param("id", 2).param("type", EdibleKind::Food);
        assert_eq!(request.query_param("type"), Some("food"));
        assert_eq!(request.query_param("amount"), None);
    }

    #[derive(Default)]
    struct Recorder(std::cell::RefCell<Vec<Request>>);

    #[async_trait(?Send)]
    impl Transport for Recorder {
        async fn exchange(&self, request: Request) -> Result<Response, Error> {
            self.0.borrow_mut().push(request);
            Ok(Response::ok(serde_json::json!({"Energy": [2100.0, "kcal"]})))
        }
    }

    #[test]
    fn consumer_totals_by_date_or_window() {
        let recorder = Rc::new(Recorder::default());
        let api = Api::new(recorder.clone());

        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let totals = futures::executor::block_on(api.consumer_totals("ada", DayRange::On(date))).unwrap();
        assert_eq!(totals["Energy"].0, 2100.0);

        let start = "2024-03-09T04:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let end = "2024-03-10T04:00:00Z".parse::<DateTime<Utc>>().unwrap();
        futures::executor::block_on(api.consumer_totals("ada", DayRange::Between { start, end })).unwrap();

        let requests = recorder.0.borrow();
        assert_eq!(requests[0].path, "/eat");
        assert_eq!(
            requests[0].query,
            [("consumer".to_string(), "ada".to_string()), ("date".to_string(), "2024-03-09".to_string())]
        );
        assert_eq!(requests[1].query_param("start"), Some("2024-03-09T04:00:00.000Z"));
        assert_eq!(requests[1].query_param("end"), Some("2024-03-10T04:00:00.000Z"));
        assert_eq!(requests[1].query_param("date"), None);
    }
}
