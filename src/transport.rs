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
use std::fs::File;
use std::io::Read;

use crate::config::ZapiConfig;
use crate::error::*;

use log::{debug, warn};
use native_tls::{Certificate, TlsConnector};
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

static FILER_URL: &str = "servlets/netapp.servlets.admin.XMLrequest_filer";

/// One request/response round trip with the server
pub trait Transport {
    /// Post an encoded envelope and hand back the full response body.
    /// The response must be completely read and released before this
    /// returns.
    fn send(&self, envelope: Vec<u8>) -> ZapiResult<String>;
}

pub fn zapi_url(config: &ZapiConfig) -> String {
    let scheme = if config.secure { "https" } else { "http" };
    format!("{}://{}/{}", scheme, config.endpoint, FILER_URL)
}

pub struct HttpTransport {
    client: Client,
    url: String,
    user: String,
    password: String,
}

impl HttpTransport {
    pub fn new(config: &ZapiConfig) -> ZapiResult<Self> {
        let mut builder = Client::builder().timeout(config.timeout());
        if config.secure {
            let mut tls = TlsConnector::builder();
            match config.certificate {
                Some(ref path) => {
                    let der = {
                        let mut buf = Vec::new();
                        let mut f = File::open(path)?;
                        f.read_to_end(&mut buf)?;
                        buf
                    };
                    tls.add_root_certificate(Certificate::from_der(&der)?);
                }
                None => {
                    // Controllers ship with self signed certificates
                    warn!(
                        "certificate validation is disabled for {}",
                        config.endpoint
                    );
                    tls.danger_accept_invalid_certs(true);
                }
            }
            builder = builder.use_preconfigured_tls(tls.build()?);
        }
        let client = builder.build()?;
        Ok(HttpTransport::with_client(&client, config))
    }

    /// Reuse an already configured client.  TLS and timeout settings of
    /// the config are ignored.
    pub fn with_client(client: &Client, config: &ZapiConfig) -> Self {
        HttpTransport {
            client: client.clone(),
            url: zapi_url(config),
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn send(&self, envelope: Vec<u8>) -> ZapiResult<String> {
        debug!("Sending: {}", String::from_utf8_lossy(&envelope));
        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/xml"))
            .body(envelope)
            .send()?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ZapiError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        // text() takes the response by value so the body is drained and the
        // connection handed back before the next page is requested
        let data = response.text()?;
        debug!("api_request response: {}", data);

        Ok(data)
    }
}

/// Replays canned response bodies and records every request sent
#[cfg(test)]
pub(crate) struct ScriptedTransport {
    responses: std::cell::RefCell<std::collections::VecDeque<ZapiResult<String>>>,
    requests: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl ScriptedTransport {
    pub fn new(responses: Vec<ZapiResult<String>>) -> Self {
        ScriptedTransport {
            responses: std::cell::RefCell::new(responses.into_iter().collect()),
            requests: std::cell::RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn round_trips(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[cfg(test)]
impl Transport for ScriptedTransport {
    fn send(&self, envelope: Vec<u8>) -> ZapiResult<String> {
        self.requests
            .borrow_mut()
            .push(String::from_utf8(envelope).unwrap());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ZapiError::new("no scripted response left".into())))
    }
}

#[test]
fn test_zapi_url() {
    let mut config = ZapiConfig::new("10.1.1.1", "admin", "pass");
    assert_eq!(
        zapi_url(&config),
        "http://10.1.1.1/servlets/netapp.servlets.admin.XMLrequest_filer"
    );
    config.secure = true;
    assert_eq!(
        zapi_url(&config),
        "https://10.1.1.1/servlets/netapp.servlets.admin.XMLrequest_filer"
    );
}

#[test]
fn test_secure_transport_builds() {
    let mut config = ZapiConfig::new("cluster1:443", "admin", "pass");
    config.secure = true;
    let transport = HttpTransport::new(&config).unwrap();
    assert!(transport.url().starts_with("https://cluster1:443/"));
}

#[test]
fn test_missing_certificate_file() {
    let mut config = ZapiConfig::new("cluster1", "admin", "pass");
    config.secure = true;
    config.certificate = Some("tests/zapi/does-not-exist.der".into());
    match HttpTransport::new(&config) {
        Err(ZapiError::IoError(_)) => {}
        Err(e) => panic!("expected an io error, got {}", e),
        Ok(_) => panic!("expected an io error"),
    }
}
