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
use crate::client::{Command, ZapiClient};
use crate::error::*;
use crate::transport::Transport;

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "system-get-version")]
pub struct SystemGetVersion {}

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "results")]
pub struct SystemVersionInfo {
    pub build_timestamp: Option<u64>,
    pub is_clustered: Option<bool>,
    pub version: Option<String>,
}

impl Command for SystemGetVersion {
    type Response = SystemVersionInfo;
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "system-get-ontapi-version")]
pub struct SystemGetOntapiVersion {}

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "results")]
pub struct OntapiVersion {
    pub major_version: Option<u32>,
    pub minor_version: Option<u32>,
}

impl Command for SystemGetOntapiVersion {
    type Response = OntapiVersion;
}

impl<T: Transport> ZapiClient<T> {
    pub fn system_version(&self) -> ZapiResult<SystemVersionInfo> {
        self.invoke(&SystemGetVersion {})
    }

    /// (major, minor) of the highest api version the server speaks
    pub fn ontapi_version(&self) -> ZapiResult<(u32, u32)> {
        let v = self.invoke(&SystemGetOntapiVersion {})?;
        match (v.major_version, v.minor_version) {
            (Some(major), Some(minor)) => Ok((major, minor)),
            _ => Err(ZapiError::DecodeError(format!(
                "incomplete ontapi version {:?}",
                v
            ))),
        }
    }
}

#[test]
fn test_system_version() {
    let data = super::read_fixture("system_get_version.xml");
    let client = crate::client::scripted_client(vec![Ok(data)]);
    let version = client.system_version().unwrap();
    assert_eq!(version.is_clustered, Some(true));
    assert_eq!(version.build_timestamp, Some(1_548_810_000));
    assert!(version
        .version
        .unwrap()
        .starts_with("NetApp Release 9.5P1"));
    let request = &client.transport().requests()[0];
    println!("request: {}", request);
    assert!(request.contains("<system-get-version"));
    assert!(!request.contains("<version>"));
    assert!(request.contains("vfiler=\"svm1\""));
}

#[test]
fn test_ontapi_version() {
    let client = crate::client::scripted_client(vec![
        crate::client::passed("<major-version>1</major-version><minor-version>150</minor-version>"),
        crate::client::passed("<major-version>1</major-version>"),
    ]);
    assert_eq!(client.ontapi_version().unwrap(), (1, 150));
    assert!(client.ontapi_version().unwrap_err().is_decode());
}
