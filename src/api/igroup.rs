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
use crate::query::IterRecord;
use crate::record::EmptyResponse;
use crate::transport::Transport;

use log::info;

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "initiator-info")]
pub struct InitiatorInfo {
    pub initiator_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "initiator-group-info")]
pub struct InitiatorGroupInfo {
    pub initiator_group_alua_enabled: Option<bool>,
    pub initiator_group_name: Option<String>,
    /// iscsi, fcp or mixed
    pub initiator_group_type: Option<String>,
    pub initiator_group_os_type: Option<String>,
    pub initiator_group_uuid: Option<String>,
    #[zapi(list = "initiator-info")]
    pub initiators: Option<Vec<InitiatorInfo>>,
    pub vserver: Option<String>,
}

impl InitiatorGroupInfo {
    pub fn initiator_names(&self) -> Vec<&str> {
        match self.initiators {
            Some(ref initiators) => initiators
                .iter()
                .filter_map(|i| i.initiator_name.as_ref().map(|n| n.as_str()))
                .collect(),
            None => vec![],
        }
    }
}

impl IterRecord for InitiatorGroupInfo {
    const ITER_API: &'static str = "igroup-get-iter";
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "igroup-create")]
pub struct IgroupCreate {
    pub initiator_group_name: Option<String>,
    pub initiator_group_type: Option<String>,
    pub os_type: Option<String>,
}

impl Command for IgroupCreate {
    type Response = EmptyResponse;
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "igroup-add")]
pub struct IgroupAdd {
    pub force: Option<bool>,
    pub initiator: Option<String>,
    pub initiator_group_name: Option<String>,
}

impl Command for IgroupAdd {
    type Response = EmptyResponse;
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "igroup-destroy")]
pub struct IgroupDestroy {
    pub force: Option<bool>,
    pub initiator_group_name: Option<String>,
}

impl Command for IgroupDestroy {
    type Response = EmptyResponse;
}

impl<T: Transport> ZapiClient<T> {
    pub fn igroup_get_all(&self) -> ZapiResult<Vec<InitiatorGroupInfo>> {
        self.get_all(None)
    }

    pub fn igroup_get(&self, name: &str) -> ZapiResult<Option<InitiatorGroupInfo>> {
        let groups = self.get_all(Some(InitiatorGroupInfo {
            initiator_group_name: Some(name.to_string()),
            ..Default::default()
        }))?;
        Ok(groups.into_iter().next())
    }

    pub fn igroup_create(&self, name: &str, igroup_type: &str, os_type: &str) -> ZapiResult<()> {
        info!("creating {} igroup {}", igroup_type, name);
        self.invoke(&IgroupCreate {
            initiator_group_name: Some(name.to_string()),
            initiator_group_type: Some(igroup_type.to_string()),
            os_type: Some(os_type.to_string()),
        })?;
        Ok(())
    }

    pub fn igroup_add(&self, name: &str, initiator: &str) -> ZapiResult<()> {
        self.invoke(&IgroupAdd {
            initiator: Some(initiator.to_string()),
            initiator_group_name: Some(name.to_string()),
            ..Default::default()
        })?;
        Ok(())
    }

    /// `force` destroys the group even while luns are mapped to it
    pub fn igroup_destroy(&self, name: &str, force: bool) -> ZapiResult<()> {
        self.invoke(&IgroupDestroy {
            force: Some(force),
            initiator_group_name: Some(name.to_string()),
        })?;
        Ok(())
    }
}

#[test]
fn test_igroup_parser() {
    let client = crate::client::scripted_client(vec![crate::client::passed(
        "<attributes-list><initiator-group-info>\
         <initiator-group-name>docker</initiator-group-name>\
         <initiator-group-type>iscsi</initiator-group-type>\
         <initiators>\
         <initiator-info><initiator-name>iqn.1994-05.com.redhat:a1</initiator-name></initiator-info>\
         <initiator-info><initiator-name>iqn.1994-05.com.redhat:b2</initiator-name></initiator-info>\
         </initiators>\
         </initiator-group-info></attributes-list><num-records>1</num-records>",
    )]);
    let group = client.igroup_get("docker").unwrap().unwrap();
    assert_eq!(
        group.initiator_names(),
        vec!["iqn.1994-05.com.redhat:a1", "iqn.1994-05.com.redhat:b2"]
    );
    assert_eq!(group.initiator_group_type, Some("iscsi".to_string()));
}

#[test]
fn test_igroup_without_initiators() {
    let group = InitiatorGroupInfo::default();
    assert!(group.initiator_names().is_empty());
}

#[test]
fn test_igroup_create_and_add() {
    let client = crate::client::scripted_client(vec![
        crate::client::passed(""),
        crate::client::passed(""),
        Ok("<netapp><results status=\"failed\" errno=\"9029\" reason=\"Initiator group is in use\"/></netapp>"
            .to_string()),
    ]);
    client.igroup_create("docker", "iscsi", "linux").unwrap();
    client
        .igroup_add("docker", "iqn.1994-05.com.redhat:a1")
        .unwrap();
    let err = client.igroup_destroy("docker", false).unwrap_err();
    assert_eq!(err.errno(), Some("9029"));

    let requests = client.transport().requests();
    assert!(requests[0].contains("<initiator-group-type>iscsi</initiator-group-type>"));
    assert!(requests[0].contains("<os-type>linux</os-type>"));
    assert!(requests[1].contains("<initiator>iqn.1994-05.com.redhat:a1</initiator>"));
    assert!(requests[2].contains("<force>false</force>"));
}
