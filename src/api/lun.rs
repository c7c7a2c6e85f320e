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

use log::debug;

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "lun-info")]
pub struct LunInfo {
    pub alignment: Option<String>,
    pub comment: Option<String>,
    pub is_space_reservation_enabled: Option<bool>,
    pub mapped: Option<bool>,
    pub multiprotocol_type: Option<String>,
    pub online: Option<bool>,
    pub path: Option<String>,
    pub qtree: Option<String>,
    pub serial_number: Option<String>,
    pub share_state: Option<String>,
    pub size: Option<u64>,
    pub size_used: Option<u64>,
    pub state: Option<String>,
    pub uuid: Option<String>,
    pub volume: Option<String>,
    pub vserver: Option<String>,
}

impl IterRecord for LunInfo {
    const ITER_API: &'static str = "lun-get-iter";
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "lun-create-by-size")]
pub struct LunCreateBySize {
    pub comment: Option<String>,
    pub ostype: Option<String>,
    pub path: Option<String>,
    /// Bytes
    pub size: Option<u64>,
    pub space_reservation_enabled: Option<bool>,
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "results")]
pub struct LunCreateBySizeResponse {
    pub actual_size: Option<u64>,
}

impl Command for LunCreateBySize {
    type Response = LunCreateBySizeResponse;
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "lun-destroy")]
pub struct LunDestroy {
    pub destroy_fenced_lun: Option<bool>,
    pub force: Option<bool>,
    pub path: Option<String>,
}

impl Command for LunDestroy {
    type Response = EmptyResponse;
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "lun-map")]
pub struct LunMap {
    pub initiator_group: Option<String>,
    /// Let the server pick when unset
    pub lun_id: Option<u32>,
    pub path: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "results")]
pub struct LunMapResponse {
    pub lun_id_assigned: Option<u32>,
}

impl Command for LunMap {
    type Response = LunMapResponse;
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "lun-unmap")]
pub struct LunUnmap {
    pub initiator_group: Option<String>,
    pub path: Option<String>,
}

impl Command for LunUnmap {
    type Response = EmptyResponse;
}

impl<T: Transport> ZapiClient<T> {
    /// All luns matching the populated fields of `query`
    pub fn lun_get_all(&self, query: LunInfo) -> ZapiResult<Vec<LunInfo>> {
        self.get_all(Some(query))
    }

    pub fn lun_get(&self, path: &str) -> ZapiResult<Option<LunInfo>> {
        let luns = self.lun_get_all(LunInfo {
            path: Some(path.to_string()),
            ..Default::default()
        })?;
        Ok(luns.into_iter().next())
    }

    /// Returns the size the server actually allocated
    pub fn lun_create(
        &self,
        path: &str,
        size: u64,
        ostype: &str,
        space_reserved: bool,
    ) -> ZapiResult<u64> {
        let res = self.invoke(&LunCreateBySize {
            ostype: Some(ostype.to_string()),
            path: Some(path.to_string()),
            size: Some(size),
            space_reservation_enabled: Some(space_reserved),
            ..Default::default()
        })?;
        debug!("created lun {}: {:?}", path, res);
        Ok(res.actual_size.unwrap_or(size))
    }

    pub fn lun_destroy(&self, path: &str) -> ZapiResult<()> {
        self.invoke(&LunDestroy {
            path: Some(path.to_string()),
            ..Default::default()
        })?;
        Ok(())
    }

    /// Map a lun to an initiator group and return the lun id it got
    pub fn lun_map(&self, path: &str, igroup: &str, lun_id: Option<u32>) -> ZapiResult<u32> {
        let res = self.invoke(&LunMap {
            initiator_group: Some(igroup.to_string()),
            lun_id,
            path: Some(path.to_string()),
        })?;
        match (res.lun_id_assigned, lun_id) {
            (Some(id), _) => Ok(id),
            (None, Some(id)) => Ok(id),
            (None, None) => Err(ZapiError::DecodeError(format!(
                "lun-map of {} did not return lun-id-assigned",
                path
            ))),
        }
    }

    pub fn lun_unmap(&self, path: &str, igroup: &str) -> ZapiResult<()> {
        self.invoke(&LunUnmap {
            initiator_group: Some(igroup.to_string()),
            path: Some(path.to_string()),
        })?;
        Ok(())
    }
}

#[test]
fn test_lun_list_parser() {
    use crate::envelope::decode;
    use crate::iter::attributes_list;

    let data = super::read_fixture("lun_get_iter.xml");
    let res = decode(&data).unwrap();
    let luns: Vec<LunInfo> = attributes_list(&res.element).unwrap();
    println!("res: {:#?}", luns);
    assert_eq!(luns.len(), 2);
    assert_eq!(luns[0].path.as_ref().map(|s| s.as_str()), Some("/vol/docker_vol1/lun0"));
    assert_eq!(luns[0].size, Some(1_073_741_824));
    assert_eq!(luns[0].mapped, Some(true));
    assert_eq!(luns[1].online, Some(false));
}

#[test]
fn test_lun_create_and_map() {
    let client = crate::client::scripted_client(vec![
        crate::client::passed("<actual-size>1075838976</actual-size>"),
        crate::client::passed("<lun-id-assigned>3</lun-id-assigned>"),
    ]);
    let size = client
        .lun_create("/vol/v1/lun0", 1_073_741_824, "linux", false)
        .unwrap();
    assert_eq!(size, 1_075_838_976);
    assert_eq!(client.lun_map("/vol/v1/lun0", "docker", None).unwrap(), 3);

    let requests = client.transport().requests();
    assert!(requests[0].contains("<size>1073741824</size>"));
    assert!(requests[0].contains("<space-reservation-enabled>false</space-reservation-enabled>"));
    assert!(!requests[0].contains("<comment"));
    assert!(requests[1].contains("<initiator-group>docker</initiator-group>"));
    assert!(!requests[1].contains("lun-id"));
}

#[test]
fn test_lun_get_missing() {
    let client = crate::client::scripted_client(vec![crate::client::passed(
        "<num-records>0</num-records>",
    )]);
    assert_eq!(client.lun_get("/vol/v1/nope").unwrap(), None);
}

#[test]
fn test_lun_get_first_match() {
    let client = crate::client::scripted_client(vec![crate::client::passed(
        "<attributes-list>\
         <lun-info><path>/vol/v1/lun0</path><vserver>svm1</vserver></lun-info>\
         <lun-info><path>/vol/v1/lun0</path><vserver>svm2</vserver></lun-info>\
         </attributes-list><num-records>2</num-records>",
    )]);
    let lun = client.lun_get("/vol/v1/lun0").unwrap().unwrap();
    assert_eq!(lun.vserver, Some("svm1".to_string()));
}
