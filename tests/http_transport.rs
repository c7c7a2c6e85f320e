/*
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
//! The real HTTP transport against a mock filer
use std::net::TcpListener;

use mockito::{Matcher, Mock, Server, ServerGuard};
use netapp_zapi::api::lun::LunInfo;
use netapp_zapi::{HttpTransport, ZapiClient, ZapiConfig, ZapiError};
use simplelog::{Config, LevelFilter, SimpleLogger};

static FILER_PATH: &str = "/servlets/netapp.servlets.admin.XMLrequest_filer";

fn init_logging() {
    // Several tests share the process wide logger
    let _ = SimpleLogger::init(LevelFilter::Debug, Config::default());
}

fn client_for(host: &str) -> ZapiClient {
    let mut config = ZapiConfig::new(host, "admin", "secret");
    config.vserver = "svm1".into();
    config.max_records = Some(2);
    let http = reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .unwrap();
    let transport = HttpTransport::with_client(&http, &config);
    ZapiClient::with_transport(config, transport).unwrap()
}

/// A filer request for the given body pattern.  admin:secret is
/// YWRtaW46c2VjcmV0.
fn filer_mock(server: &mut ServerGuard, body: &str) -> Mock {
    server
        .mock("POST", FILER_PATH)
        .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
        .match_header("content-type", "application/xml")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("vfiler=\"svm1\"".to_string()),
            Matcher::Regex(body.to_string()),
        ]))
}

fn page(records: &[&str], next_tag: Option<&str>) -> String {
    let luns: String = records
        .iter()
        .map(|p| format!("<lun-info><path>{}</path></lun-info>", p))
        .collect();
    let tag = next_tag
        .map(|t| format!("<next-tag>{}</next-tag>", t))
        .unwrap_or_default();
    format!(
        "<?xml version='1.0' encoding='UTF-8' ?>\
         <netapp version='1.21' xmlns='http://www.netapp.com/filer/admin'>\
         <results status=\"passed\"><attributes-list>{}</attributes-list>{}\
         <num-records>{}</num-records></results></netapp>",
        luns,
        tag,
        records.len()
    )
}

// The first page carries no tag, so its command closes right after the query
const FIRST_PAGE: &str = "<max-records>2</max-records><query>.*</query></lun-get-iter>";
const SECOND_PAGE: &str = "<tag>v1:l2</tag></lun-get-iter>";

#[test]
fn test_listing_over_http() {
    init_logging();
    let mut server = Server::new();
    let first = filer_mock(&mut server, FIRST_PAGE)
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(page(&["/vol/v1/l1", "/vol/v1/l2"], Some("v1:l2")))
        .expect(1)
        .create();
    let second = filer_mock(&mut server, SECOND_PAGE)
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(page(&["/vol/v1/l3"], None))
        .expect(1)
        .create();

    let client = client_for(&server.host_with_port());
    let luns = client.lun_get_all(LunInfo::default()).unwrap();
    let paths: Vec<String> = luns.into_iter().filter_map(|l| l.path).collect();
    assert_eq!(paths, vec!["/vol/v1/l1", "/vol/v1/l2", "/vol/v1/l3"]);

    first.assert();
    second.assert();
}

#[test]
fn test_unauthorized_is_transport_error() {
    init_logging();
    let mut server = Server::new();
    let denied = filer_mock(&mut server, "<system-get-version")
        .with_status(401)
        .with_body("<html>denied</html>")
        .expect(1)
        .create();

    let client = client_for(&server.host_with_port());
    let err = client.system_version().unwrap_err();
    assert!(err.is_transport(), "{:?}", err);
    match err {
        ZapiError::HttpStatus { status, .. } => assert_eq!(status, 401),
        e => panic!("unexpected error {:?}", e),
    }
    denied.assert();
}

#[test]
fn test_second_page_http_error_aborts() {
    init_logging();
    let mut server = Server::new();
    let first = filer_mock(&mut server, FIRST_PAGE)
        .with_status(200)
        .with_body(page(&["/vol/v1/l1", "/vol/v1/l2"], Some("v1:l2")))
        .expect(1)
        .create();
    let second = filer_mock(&mut server, SECOND_PAGE)
        .with_status(401)
        .expect(1)
        .create();

    let client = client_for(&server.host_with_port());
    let err = client.lun_get_all(LunInfo::default()).unwrap_err();
    match err {
        ZapiError::HttpStatus { status, .. } => assert_eq!(status, 401),
        e => panic!("unexpected error {:?}", e),
    }
    first.assert();
    second.assert();
}

#[test]
fn test_connection_refused() {
    init_logging();
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(&addr.to_string());
    let err = client.ontapi_version().unwrap_err();
    assert!(err.is_transport(), "{:?}", err);
}
