use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{MetricSample, UptimeWindow};
use crate::error::ArchiverError;

pub const DEFAULT_NODEPING_BASE_URL: &str = "https://api.nodeping.com/api/1";

#[derive(Debug, Clone, Deserialize)]
pub struct ContactGroup {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Check {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub notifications: Vec<HashMap<String, Value>>,
}

impl Check {
    pub fn notifies(&self, contact_group_id: &str) -> bool {
        self.notifications
            .iter()
            .any(|notification| notification.contains_key(contact_group_id))
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UptimeEntry {
    #[serde(default)]
    pub uptime: f64,
}

#[derive(Debug, Clone, Default)]
pub struct UptimeResults {
    pub check_labels: Vec<String>,
    pub uptimes: HashMap<String, f64>,
    pub start_time: i64,
    pub end_time: i64,
}

impl UptimeResults {
    pub fn samples(&self) -> Vec<MetricSample> {
        self.check_labels
            .iter()
            .filter_map(|label| {
                self.uptimes
                    .get(label)
                    .map(|uptime| MetricSample::new(label.clone(), *uptime))
            })
            .collect()
    }
}

pub trait NodepingClient: Send + Sync {
    fn list_contact_groups(&self) -> Result<HashMap<String, ContactGroup>, ArchiverError>;
    fn list_checks(&self) -> Result<Vec<Check>, ArchiverError>;
    fn get_uptime(
        &self,
        check_id: &str,
        window: &UptimeWindow,
    ) -> Result<HashMap<String, UptimeEntry>, ArchiverError>;
}

#[derive(Clone)]
pub struct NodepingHttpClient {
    client: Client,
    base_url: String,
    token: String,
    customer_id: Option<String>,
}

impl NodepingHttpClient {
    pub fn new(
        base_url: &str,
        token: &str,
        customer_id: Option<&str>,
    ) -> Result<Self, ArchiverError> {
        if token.trim().is_empty() {
            return Err(ArchiverError::MissingSetting("NODEPING_TOKEN".to_string()));
        }
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("uptime-archiver/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ArchiverError::NodepingHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| ArchiverError::NodepingHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            customer_id: customer_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        })
    }

    fn customer_path(&self, collection: &str) -> String {
        match &self.customer_id {
            Some(customer) => format!("/{collection}/{customer}"),
            None => format!("/{collection}"),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ArchiverError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "nodeping request");
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.token, Some(""))
            .send()
            .map_err(|err| ArchiverError::NodepingHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let body = response
            .text()
            .map_err(|err| ArchiverError::NodepingHttp(err.to_string()))?;
        serde_json::from_str(&body).map_err(|err| {
            ArchiverError::MalformedResponse(format!("invalid NodePing body {}: {err}", excerpt(&body)))
        })
    }

    fn handle_status(response: Response) -> Result<Response, ArchiverError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .map(|body| excerpt(&body).to_string())
            .unwrap_or_else(|_| "NodePing request failed".to_string());
        Err(ArchiverError::NodepingStatus { status, message })
    }
}

impl NodepingClient for NodepingHttpClient {
    fn list_contact_groups(&self) -> Result<HashMap<String, ContactGroup>, ArchiverError> {
        self.get_json(&self.customer_path("contactgroups"))
    }

    fn list_checks(&self) -> Result<Vec<Check>, ArchiverError> {
        let checks: HashMap<String, Check> = self.get_json(&self.customer_path("checks"))?;
        Ok(checks
            .into_iter()
            .map(|(key, mut check)| {
                if check.id.is_empty() {
                    check.id = key;
                }
                check
            })
            .collect())
    }

    fn get_uptime(
        &self,
        check_id: &str,
        window: &UptimeWindow,
    ) -> Result<HashMap<String, UptimeEntry>, ArchiverError> {
        self.get_json(&uptime_path(check_id, window))
    }
}

pub fn uptime_path(check_id: &str, window: &UptimeWindow) -> String {
    format!(
        "/results/uptime/{check_id}?end={}&start={}",
        window.end.timestamp_millis(),
        window.start.timestamp_millis()
    )
}

pub fn contact_group_id<N: NodepingClient + ?Sized>(
    client: &N,
    name: &str,
) -> Result<String, ArchiverError> {
    client
        .list_contact_groups()?
        .into_iter()
        .find(|(_, group)| group.name == name)
        .map(|(id, _)| id)
        .ok_or_else(|| ArchiverError::ContactGroupNotFound(name.to_string()))
}

pub fn checks_for_group(
    checks: &[Check],
    contact_group_id: &str,
) -> (Vec<String>, HashMap<String, String>) {
    let mut labels = Vec::new();
    let mut ids = HashMap::new();
    for check in checks.iter().filter(|check| check.notifies(contact_group_id)) {
        labels.push(check.label.clone());
        ids.insert(check.label.clone(), check.id.clone());
    }
    labels.sort();
    labels.dedup();
    (labels, ids)
}

pub fn uptimes_for_contact_group<N: NodepingClient + ?Sized>(
    client: &N,
    group: &str,
    window: &UptimeWindow,
) -> Result<UptimeResults, ArchiverError> {
    let group_id = contact_group_id(client, group)?;
    let checks = client.list_checks()?;
    let (check_labels, check_ids) = checks_for_group(&checks, &group_id);

    let mut uptimes = HashMap::new();
    for label in &check_labels {
        let Some(check_id) = check_ids.get(label) else {
            continue;
        };
        match client.get_uptime(check_id, window) {
            Ok(entries) => match entries.get("total") {
                Some(total) => {
                    uptimes.insert(label.clone(), total.uptime);
                }
                None => warn!(check = %label, "uptime response has no total entry"),
            },
            Err(err) => warn!(check = %label, %err, "failed to fetch uptime"),
        }
    }

    Ok(UptimeResults {
        check_labels,
        uptimes,
        start_time: window.start.timestamp(),
        end_time: window.end.timestamp(),
    })
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(250) {
        Some((cut, _)) => &body[..cut],
        None => body,
    }
}
