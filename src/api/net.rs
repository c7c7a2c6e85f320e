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

/// A logical interface (LIF)
#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "net-interface-info")]
pub struct NetInterfaceInfo {
    pub address: Option<String>,
    pub administrative_status: Option<String>,
    pub current_node: Option<String>,
    pub current_port: Option<String>,
    #[zapi(list = "data-protocol")]
    pub data_protocols: Option<Vec<String>>,
    pub home_node: Option<String>,
    pub home_port: Option<String>,
    pub interface_name: Option<String>,
    pub is_home: Option<bool>,
    pub netmask: Option<String>,
    pub operational_status: Option<String>,
    pub role: Option<String>,
    pub vserver: Option<String>,
}

impl IterRecord for NetInterfaceInfo {
    const ITER_API: &'static str = "net-interface-get-iter";
}

impl<T: Transport> ZapiClient<T> {
    pub fn net_interface_get_all(&self) -> ZapiResult<Vec<NetInterfaceInfo>> {
        self.get_all(None)
    }

    /// Addresses of the data interfaces serving `protocol` (iscsi, nfs..).
    /// Only the address and protocol list are requested from the server.
    pub fn net_interface_addresses(&self, protocol: &str) -> ZapiResult<Vec<String>> {
        let desired = NetInterfaceInfo {
            address: Some(String::new()),
            data_protocols: Some(vec![]),
            ..Default::default()
        };
        let query = NetInterfaceInfo {
            role: Some("data".into()),
            ..Default::default()
        };
        let lifs = self.get_iter(Some(query), Some(desired))?.into_records()?;
        Ok(lifs
            .into_iter()
            .filter(|lif| match lif.data_protocols {
                Some(ref protos) => protos.iter().any(|p| p == protocol),
                None => false,
            })
            .filter_map(|lif| lif.address)
            .collect())
    }
}

#[test]
fn test_net_interface_addresses() {
    let client = crate::client::scripted_client(vec![crate::client::passed(
        "<attributes-list>\
         <net-interface-info><address>10.0.0.10</address>\
         <data-protocols><data-protocol>iscsi</data-protocol></data-protocols></net-interface-info>\
         <net-interface-info><address>10.0.0.11</address>\
         <data-protocols><data-protocol>nfs</data-protocol><data-protocol>cifs</data-protocol></data-protocols>\
         </net-interface-info>\
         <net-interface-info><address>10.0.0.12</address></net-interface-info>\
         </attributes-list><num-records>3</num-records>",
    )]);
    let addrs = client.net_interface_addresses("nfs").unwrap();
    assert_eq!(addrs, vec!["10.0.0.11".to_string()]);

    let request = &client.transport().requests()[0];
    println!("request: {}", request);
    assert!(request.contains("<desired-attributes><net-interface-info><address"));
    assert!(request.contains("<data-protocols"));
    assert!(request.contains("<query><net-interface-info><role>data</role></net-interface-info></query>"));
    assert!(!request.contains("interface-name"));
}

#[test]
fn test_net_interface_parser() {
    let client = crate::client::scripted_client(vec![crate::client::passed(
        "<attributes-list><net-interface-info>\
         <interface-name>lif1</interface-name><is-home>true</is-home>\
         <home-node>node-01</home-node><current-port>e0d</current-port>\
         </net-interface-info></attributes-list><num-records>1</num-records>",
    )]);
    let lifs = client.net_interface_get_all().unwrap();
    assert_eq!(
        lifs,
        vec![NetInterfaceInfo {
            interface_name: Some("lif1".into()),
            is_home: Some(true),
            home_node: Some("node-01".into()),
            current_port: Some("e0d".into()),
            ..Default::default()
        }]
    );
}
