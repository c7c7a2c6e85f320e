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
use crate::config::ZapiConfig;
use crate::envelope::{decode, Envelope};
use crate::error::*;
use crate::iter::{self, IterCommand, IterResult};
use crate::query::{GetIter, IterRecord};
use crate::record::ZapiRecord;
use crate::transport::{HttpTransport, Transport};

use log::debug;

/// A single, non paginated ZAPI call
pub trait Command: ZapiRecord {
    /// Decoded from the `<results>` element
    type Response: ZapiRecord;
}

/// A session with one cluster or vserver management endpoint.  Holds no
/// per call state so independent calls can share it.
pub struct ZapiClient<T = HttpTransport> {
    transport: T,
    envelope: Envelope,
    config: ZapiConfig,
}

impl ZapiClient<HttpTransport> {
    pub fn new(config: ZapiConfig) -> ZapiResult<Self> {
        let transport = HttpTransport::new(&config)?;
        ZapiClient::with_transport(config, transport)
    }
}

impl<T: Transport> ZapiClient<T> {
    pub fn with_transport(config: ZapiConfig, transport: T) -> ZapiResult<Self> {
        let envelope = Envelope::new(&config.vserver)?;
        debug!("zapi client for {:?}", config);
        Ok(ZapiClient {
            transport,
            envelope,
            config,
        })
    }

    pub fn config(&self) -> &ZapiConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one command.  A failed status comes back as an ApiError.
    pub fn invoke<C: Command>(&self, command: &C) -> ZapiResult<C::Response> {
        let req = self.envelope.encode(command)?;
        let data = self.transport.send(req)?;
        let results = decode(&data)?;
        results.status.check()?;
        results.payload()
    }

    /// Page through a listing command using the configured limits
    pub fn iterate<C: IterCommand>(&self, command: C) -> ZapiResult<IterResult<C::Record>> {
        iter::iterate(
            &self.transport,
            &self.envelope,
            command,
            &self.config.limits(),
        )
    }

    /// List records matching `query`, returning only the attributes
    /// populated in `desired`.  None for either means everything.
    pub fn get_iter<R: IterRecord>(
        &self,
        query: Option<R>,
        desired: Option<R>,
    ) -> ZapiResult<IterResult<R>> {
        let command = GetIter {
            max_records: self.config.max_records,
            tag: None,
            query,
            desired_attributes: desired,
        };
        self.iterate(command)
    }

    /// Every record matching `query`.  A failed last page is an error.
    pub fn get_all<R: IterRecord>(&self, query: Option<R>) -> ZapiResult<Vec<R>> {
        self.get_iter(query, None)?.into_records()
    }
}

#[cfg(test)]
pub(crate) fn scripted_client(
    responses: Vec<ZapiResult<String>>,
) -> ZapiClient<crate::transport::ScriptedTransport> {
    let mut config = ZapiConfig::new("cluster1", "admin", "secret");
    config.vserver = "svm1".into();
    config.max_records = Some(2);
    ZapiClient::with_transport(config, crate::transport::ScriptedTransport::new(responses))
        .unwrap()
}

#[cfg(test)]
pub(crate) fn passed(body: &str) -> ZapiResult<String> {
    Ok(format!(
        "<netapp version='1.21' xmlns='http://www.netapp.com/filer/admin'>\
         <results status=\"passed\">{}</results></netapp>",
        body
    ))
}

#[test]
fn test_invoke_failed_status() {
    let client = scripted_client(vec![Ok(
        "<netapp><results status=\"failed\" errno=\"13005\" reason=\"Unable to find API\"/></netapp>"
            .to_string(),
    )]);
    let err = client
        .invoke(&crate::api::system::SystemGetVersion {})
        .unwrap_err();
    assert_eq!(err.errno(), Some("13005"));
}

#[test]
fn test_get_all_sends_max_records() {
    let client = scripted_client(vec![
        passed(
            "<attributes-list><lun-info><path>/vol/v1/l1</path></lun-info></attributes-list>\
             <next-tag>k1</next-tag><num-records>1</num-records>",
        ),
        passed("<num-records>0</num-records>"),
    ]);
    let luns: Vec<crate::api::lun::LunInfo> = client.get_all(None).unwrap();
    assert_eq!(luns.len(), 1);
    let requests = client.transport().requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].contains("<lun-get-iter><max-records>2</max-records></lun-get-iter>"));
    assert!(requests[1].contains("<tag>k1</tag>"));
}

#[test]
fn test_get_all_failed_last_page() {
    let mut client = scripted_client(vec![Ok(
        "<netapp><results status=\"failed\" errno=\"13003\" reason=\"denied\"/></netapp>"
            .to_string(),
    )]);
    client.config.abort_on_failed_page = false;
    let err = client
        .get_all::<crate::api::lun::LunInfo>(None)
        .unwrap_err();
    assert_eq!(err.errno(), Some("13003"));
}
