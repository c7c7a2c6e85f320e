/**
* Copyright 2019 Comcast Cable Communications Management, LLC
*
* Licensed under the Apache License, Version 2.0 (the "License");
* you may not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
* http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing, software
* distributed under the License is distributed on an "AS IS" BASIS,
* WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
* See the License for the specific language governing permissions and
* limitations under the License.
*
* SPDX-License-Identifier: Apache-2.0
*/
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use crate::error::*;
use crate::iter::IterLimits;

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_pages() -> Option<usize> {
    Some(10_000)
}

fn default_deadline_secs() -> Option<u64> {
    Some(600)
}

fn default_abort_on_failed_page() -> bool {
    true
}

#[derive(Clone, Deserialize)]
pub struct ZapiConfig {
    /// Management address of the cluster or vserver lif
    pub endpoint: String,
    pub user: String,
    pub password: String,
    /// Tenant scope sent as the vfiler attribute.  Empty means cluster scope.
    #[serde(default)]
    pub vserver: String,
    /// https when true.  Without a certificate the server certificate
    /// is not validated.
    #[serde(default)]
    pub secure: bool,
    /// Optional certificate file to trust for the server
    /// der encoded
    pub certificate: Option<String>,
    /// Per request http timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// max-records to ask for on each page of a listing
    #[serde(default)]
    pub max_records: Option<u32>,
    #[serde(default = "default_max_pages")]
    pub max_pages: Option<usize>,
    /// Overall time budget for one listing call
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: Option<u64>,
    /// Stop a listing on the first page with status="failed" instead of
    /// only reporting the last page's status
    #[serde(default = "default_abort_on_failed_page")]
    pub abort_on_failed_page: bool,
}

impl fmt::Debug for ZapiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZapiConfig")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("password", &"****")
            .field("vserver", &self.vserver)
            .field("secure", &self.secure)
            .field("certificate", &self.certificate)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_records", &self.max_records)
            .field("max_pages", &self.max_pages)
            .field("deadline_secs", &self.deadline_secs)
            .field("abort_on_failed_page", &self.abort_on_failed_page)
            .finish()
    }
}

impl ZapiConfig {
    pub fn new(endpoint: &str, user: &str, password: &str) -> Self {
        ZapiConfig {
            endpoint: endpoint.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            vserver: String::new(),
            secure: false,
            certificate: None,
            timeout_secs: default_timeout_secs(),
            max_records: None,
            max_pages: default_max_pages(),
            deadline_secs: default_deadline_secs(),
            abort_on_failed_page: default_abort_on_failed_page(),
        }
    }

    pub fn from_json(data: &str) -> ZapiResult<Self> {
        let config: ZapiConfig = serde_json::from_str(data)?;
        if config.endpoint.is_empty() {
            return Err(ZapiError::new("endpoint is missing from config".into()));
        }
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ZapiResult<Self> {
        let mut s = String::new();
        let mut f = File::open(path)?;
        f.read_to_string(&mut s)?;
        ZapiConfig::from_json(&s)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn limits(&self) -> IterLimits {
        IterLimits {
            max_pages: self.max_pages,
            deadline: self.deadline_secs.map(Duration::from_secs),
            abort_on_failed_page: self.abort_on_failed_page,
        }
    }
}

#[test]
fn test_config_defaults() {
    let config = ZapiConfig::from_json(
        r#"{"endpoint": "10.0.0.1", "user": "admin", "password": "secret"}"#,
    )
    .unwrap();
    assert_eq!(config.vserver, "");
    assert!(!config.secure);
    assert_eq!(config.timeout_secs, 60);
    assert_eq!(config.max_pages, Some(10_000));
    assert_eq!(config.deadline_secs, Some(600));
    assert!(config.abort_on_failed_page);
    assert!(!format!("{:?}", config).contains("secret"));
}

#[test]
fn test_config_file() {
    let config = ZapiConfig::from_file("tests/zapi/config.json").unwrap();
    assert_eq!(config.endpoint, "cluster1.example.com");
    assert_eq!(config.vserver, "svm1");
    assert!(config.secure);
    assert_eq!(config.max_records, Some(500));
    assert_eq!(config.max_pages, None);
    assert!(!config.limits().abort_on_failed_page);
}

#[test]
fn test_config_missing_endpoint() {
    assert!(ZapiConfig::from_json(r#"{"endpoint": "", "user": "a", "password": "b"}"#).is_err());
    assert!(ZapiConfig::from_json(r#"{"user": "a"}"#).is_err());
}
