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
use crate::client::ZapiClient;
use crate::error::*;
use crate::query::IterRecord;
use crate::transport::Transport;

use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "vserver-info")]
pub struct VserverInfo {
    #[zapi(list = "aggr-name")]
    pub aggr_list: Option<Vec<String>>,
    #[zapi(list = "protocol")]
    pub allowed_protocols: Option<Vec<String>>,
    pub comment: Option<String>,
    pub language: Option<String>,
    pub operational_state: Option<String>,
    pub root_volume: Option<String>,
    pub root_volume_aggregate: Option<String>,
    pub state: Option<String>,
    pub uuid: Option<Uuid>,
    pub vserver_name: Option<String>,
    pub vserver_type: Option<String>,
}

impl IterRecord for VserverInfo {
    const ITER_API: &'static str = "vserver-get-iter";
}

impl<T: Transport> ZapiClient<T> {
    /// Only returns what the credentials can see.  A vserver scoped session
    /// lists its own vserver.
    pub fn vserver_get_all(&self) -> ZapiResult<Vec<VserverInfo>> {
        self.get_all(None)
    }

    pub fn vserver_get(&self, name: &str) -> ZapiResult<Option<VserverInfo>> {
        let vservers = self.get_all(Some(VserverInfo {
            vserver_name: Some(name.to_string()),
            ..Default::default()
        }))?;
        Ok(vservers.into_iter().next())
    }
}

#[test]
fn test_vserver_parser() {
    let client = crate::client::scripted_client(vec![crate::client::passed(
        "<attributes-list><vserver-info>\
         <aggr-list><aggr-name>aggr1</aggr-name><aggr-name>aggr2</aggr-name></aggr-list>\
         <allowed-protocols><protocol>nfs</protocol><protocol>iscsi</protocol></allowed-protocols>\
         <state>running</state>\
         <uuid>5d7e4a1b-0c2f-11e9-9b6a-00a098d39e12</uuid>\
         <vserver-name>svm1</vserver-name><vserver-type>data</vserver-type>\
         </vserver-info></attributes-list><num-records>1</num-records>",
    )]);
    let svm = client.vserver_get("svm1").unwrap().unwrap();
    assert_eq!(
        svm.aggr_list,
        Some(vec!["aggr1".to_string(), "aggr2".to_string()])
    );
    assert_eq!(
        svm.uuid,
        Some(Uuid::parse_str("5d7e4a1b-0c2f-11e9-9b6a-00a098d39e12").unwrap())
    );
    assert_eq!(svm.vserver_type, Some("data".to_string()));
    assert!(client.transport().requests()[0].contains("<vserver-name>svm1</vserver-name>"));
}

#[test]
fn test_vserver_bad_uuid() {
    let client = crate::client::scripted_client(vec![crate::client::passed(
        "<attributes-list><vserver-info><uuid>not-a-uuid</uuid></vserver-info></attributes-list>\
         <num-records>1</num-records>",
    )]);
    let err = client.vserver_get_all().unwrap_err();
    assert!(err.is_decode());
}
