//! Flexible volumes
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
use crate::iter::{IterCommand, IterResult};
use crate::query::IterRecord;
use crate::record::{find_child, read_field, Element, EmptyResponse, ZapiRecord};
use crate::transport::Transport;

use log::{debug, warn};

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
pub struct VolumeIdAttributes {
    pub comment: Option<String>,
    pub containing_aggregate_name: Option<String>,
    pub junction_path: Option<String>,
    pub name: Option<String>,
    pub owning_vserver_name: Option<String>,
    pub style: Option<String>,
    /// rw, ls, dp or dc
    pub r#type: Option<String>,
    pub uuid: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
pub struct VolumeSpaceAttributes {
    pub is_space_guarantee_enabled: Option<bool>,
    pub percentage_size_used: Option<u32>,
    pub size: Option<u64>,
    pub size_available: Option<u64>,
    pub size_total: Option<u64>,
    pub size_used: Option<u64>,
    pub space_guarantee: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
pub struct VolumeStateAttributes {
    pub is_node_root: Option<bool>,
    pub is_vserver_root: Option<bool>,
    /// online, offline, restricted or mixed
    pub state: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
pub struct VolumeExportAttributes {
    pub policy: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
pub struct VolumeSnapshotAttributes {
    pub snapdir_access_enabled: Option<bool>,
    pub snapshot_count: Option<u32>,
    pub snapshot_policy: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "volume-attributes")]
pub struct VolumeAttributes {
    pub volume_export_attributes: Option<VolumeExportAttributes>,
    pub volume_id_attributes: Option<VolumeIdAttributes>,
    pub volume_snapshot_attributes: Option<VolumeSnapshotAttributes>,
    pub volume_space_attributes: Option<VolumeSpaceAttributes>,
    pub volume_state_attributes: Option<VolumeStateAttributes>,
}

impl VolumeAttributes {
    /// Query template matching one volume by name
    pub fn named(name: &str) -> Self {
        VolumeAttributes {
            volume_id_attributes: Some(VolumeIdAttributes {
                name: Some(name.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.volume_id_attributes
            .as_ref()
            .and_then(|id| id.name.as_ref())
            .map(|n| n.as_str())
    }

    pub fn state(&self) -> Option<&str> {
        self.volume_state_attributes
            .as_ref()
            .and_then(|s| s.state.as_ref())
            .map(|s| s.as_str())
    }
}

impl IterRecord for VolumeAttributes {
    const ITER_API: &'static str = "volume-get-iter";
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "volume-create")]
pub struct VolumeCreate {
    pub containing_aggr_name: Option<String>,
    pub export_policy: Option<String>,
    pub junction_path: Option<String>,
    /// Bytes, or a number with a k, m, g or t suffix
    pub size: Option<String>,
    pub snapshot_policy: Option<String>,
    /// none, file or volume
    pub space_reserve: Option<String>,
    pub unix_permissions: Option<String>,
    pub volume: Option<String>,
    pub volume_type: Option<String>,
}

impl Command for VolumeCreate {
    type Response = EmptyResponse;
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "volume-destroy")]
pub struct VolumeDestroy {
    pub name: Option<String>,
    pub unmount_and_offline: Option<bool>,
}

impl Command for VolumeDestroy {
    type Response = EmptyResponse;
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "volume-offline")]
pub struct VolumeOffline {
    pub name: Option<String>,
}

impl Command for VolumeOffline {
    type Response = EmptyResponse;
}

/// Without `new_size` this just reads the current size
#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "volume-size")]
pub struct VolumeSize {
    pub new_size: Option<String>,
    pub volume: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "results")]
pub struct VolumeSizeResponse {
    pub volume_size: Option<String>,
}

impl Command for VolumeSize {
    type Response = VolumeSizeResponse;
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "volume-clone-create")]
pub struct VolumeCloneCreate {
    pub junction_path: Option<String>,
    pub parent_snapshot: Option<String>,
    pub parent_volume: Option<String>,
    pub space_reserve: Option<String>,
    pub volume: Option<String>,
}

impl Command for VolumeCloneCreate {
    type Response = EmptyResponse;
}

/// Apply `attributes` to every volume matching `query`.  Paginated like a
/// listing, each page reporting the volumes it touched.
#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "volume-modify-iter")]
pub struct VolumeModifyIter {
    #[zapi(wrapped)]
    pub attributes: Option<VolumeAttributes>,
    pub continue_on_failure: Option<bool>,
    pub max_failure_count: Option<u32>,
    pub max_records: Option<u32>,
    #[zapi(wrapped)]
    pub query: Option<VolumeAttributes>,
    pub return_failure_list: Option<bool>,
    pub return_success_list: Option<bool>,
    pub tag: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "volume-modify-iter-info")]
pub struct VolumeModifyIterInfo {
    pub error_code: Option<u32>,
    pub error_message: Option<String>,
    #[zapi(wrapped)]
    pub volume_key: Option<VolumeAttributes>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModifyOutcome {
    Succeeded(VolumeModifyIterInfo),
    Failed(VolumeModifyIterInfo),
}

impl ModifyOutcome {
    pub fn info(&self) -> &VolumeModifyIterInfo {
        match *self {
            ModifyOutcome::Succeeded(ref info) => info,
            ModifyOutcome::Failed(ref info) => info,
        }
    }

    pub fn is_success(&self) -> bool {
        match *self {
            ModifyOutcome::Succeeded(_) => true,
            ModifyOutcome::Failed(_) => false,
        }
    }
}

fn modify_list(results: &Element, list: &str) -> ZapiResult<Vec<VolumeModifyIterInfo>> {
    let mut infos = Vec::new();
    if let Some(list_element) = find_child(results, list) {
        for child in &list_element.children {
            if child.name == VolumeModifyIterInfo::TAG {
                infos.push(VolumeModifyIterInfo::from_element(child)?);
            } else {
                warn!("unexpected {} in {}", child.name, list);
            }
        }
    }
    Ok(infos)
}

impl IterCommand for VolumeModifyIter {
    type Record = ModifyOutcome;

    fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    fn records(results: &Element) -> ZapiResult<Vec<ModifyOutcome>> {
        let mut outcomes: Vec<ModifyOutcome> = modify_list(results, "success-list")?
            .into_iter()
            .map(ModifyOutcome::Succeeded)
            .collect();
        outcomes.extend(
            modify_list(results, "failure-list")?
                .into_iter()
                .map(ModifyOutcome::Failed),
        );
        Ok(outcomes)
    }

    fn num_records(results: &Element) -> ZapiResult<Option<u64>> {
        let succeeded: Option<u64> = read_field(results, "num-succeeded")?;
        let failed: Option<u64> = read_field(results, "num-failed")?;
        match (succeeded, failed) {
            (None, None) => Ok(None),
            (s, f) => Ok(Some(s.unwrap_or(0) + f.unwrap_or(0))),
        }
    }
}

impl<T: Transport> ZapiClient<T> {
    pub fn volume_get_all(&self, query: Option<VolumeAttributes>) -> ZapiResult<Vec<VolumeAttributes>> {
        self.get_all(query)
    }

    pub fn volume_get(&self, name: &str) -> ZapiResult<Option<VolumeAttributes>> {
        let vols = self.get_all(Some(VolumeAttributes::named(name)))?;
        Ok(vols.into_iter().next())
    }

    pub fn volume_create(&self, request: &VolumeCreate) -> ZapiResult<()> {
        debug!("creating volume {:?}", request.volume);
        self.invoke(request)?;
        Ok(())
    }

    pub fn volume_offline(&self, name: &str) -> ZapiResult<()> {
        self.invoke(&VolumeOffline {
            name: Some(name.to_string()),
        })?;
        Ok(())
    }

    /// The volume has to be offline, or `unmount_and_offline` set
    pub fn volume_destroy(&self, name: &str, unmount_and_offline: bool) -> ZapiResult<()> {
        self.invoke(&VolumeDestroy {
            name: Some(name.to_string()),
            unmount_and_offline: Some(unmount_and_offline),
        })?;
        Ok(())
    }

    /// Current size as reported by the server, ie `10g`
    pub fn volume_size(&self, name: &str) -> ZapiResult<String> {
        self.resize(name, None)
    }

    /// Set a new size.  `+5g` and `-5g` grow or shrink relative to the
    /// current size.
    pub fn volume_resize(&self, name: &str, new_size: &str) -> ZapiResult<String> {
        self.resize(name, Some(new_size.to_string()))
    }

    fn resize(&self, name: &str, new_size: Option<String>) -> ZapiResult<String> {
        let res = self.invoke(&VolumeSize {
            new_size,
            volume: Some(name.to_string()),
        })?;
        res.volume_size.ok_or_else(|| {
            ZapiError::DecodeError(format!("volume-size of {} returned no volume-size", name))
        })
    }

    pub fn volume_clone(&self, parent: &str, clone: &str, snapshot: Option<&str>) -> ZapiResult<()> {
        self.invoke(&VolumeCloneCreate {
            parent_snapshot: snapshot.map(|s| s.to_string()),
            parent_volume: Some(parent.to_string()),
            volume: Some(clone.to_string()),
            ..Default::default()
        })?;
        Ok(())
    }

    /// Modify every volume matching `query`.  Per volume failures are
    /// reported as ModifyOutcome::Failed rather than an error.
    pub fn volume_modify_all(
        &self,
        query: VolumeAttributes,
        attributes: VolumeAttributes,
    ) -> ZapiResult<IterResult<ModifyOutcome>> {
        self.iterate(VolumeModifyIter {
            attributes: Some(attributes),
            continue_on_failure: Some(true),
            max_records: self.config().max_records,
            query: Some(query),
            return_failure_list: Some(true),
            return_success_list: Some(true),
            ..Default::default()
        })
    }
}

#[test]
fn test_volume_list_parser() {
    use crate::envelope::decode;
    use crate::iter::attributes_list;

    let data = super::read_fixture("volume_get_iter.xml");
    let res = decode(&data).unwrap();
    let vols: Vec<VolumeAttributes> = attributes_list(&res.element).unwrap();
    println!("vols: {:#?}", vols);
    assert_eq!(vols.len(), 2);
    assert_eq!(vols[0].name(), Some("docker_vol1"));
    assert_eq!(vols[0].state(), Some("online"));
    let id = vols[0].volume_id_attributes.as_ref().unwrap();
    assert_eq!(id.r#type, Some("rw".to_string()));
    assert_eq!(id.junction_path, Some("/docker_vol1".to_string()));
    let space = vols[0].volume_space_attributes.as_ref().unwrap();
    assert_eq!(space.size_total, Some(10_200_547_328));
    assert_eq!(space.percentage_size_used, Some(4));
    assert_eq!(
        vols[0]
            .volume_export_attributes
            .as_ref()
            .and_then(|e| e.policy.clone()),
        Some("default".to_string())
    );
    assert_eq!(vols[1].state(), Some("offline"));
    assert_eq!(vols[1].volume_snapshot_attributes, None);
}

#[test]
fn test_volume_query_by_name() {
    let client = crate::client::scripted_client(vec![crate::client::passed(
        "<num-records>0</num-records>",
    )]);
    assert_eq!(client.volume_get("missing").unwrap(), None);
    let request = &client.transport().requests()[0];
    assert!(request.contains(
        "<query><volume-attributes><volume-id-attributes><name>missing</name>\
         </volume-id-attributes></volume-attributes></query>"
    ));
}

#[test]
fn test_volume_size() {
    let client = crate::client::scripted_client(vec![
        crate::client::passed("<volume-size>10g</volume-size>"),
        crate::client::passed("<volume-size>15g</volume-size>"),
        crate::client::passed(""),
    ]);
    assert_eq!(client.volume_size("vol1").unwrap(), "10g");
    assert_eq!(client.volume_resize("vol1", "+5g").unwrap(), "15g");
    assert!(client.volume_size("vol1").unwrap_err().is_decode());
    let requests = client.transport().requests();
    assert!(!requests[0].contains("new-size"));
    assert!(requests[1].contains("<new-size>+5g</new-size>"));
}

#[test]
fn test_volume_modify_iter() {
    let client = crate::client::scripted_client(vec![
        crate::client::passed(
            "<success-list><volume-modify-iter-info>\
             <volume-key><volume-attributes><volume-id-attributes><name>v1</name>\
             </volume-id-attributes></volume-attributes></volume-key>\
             </volume-modify-iter-info></success-list>\
             <failure-list><volume-modify-iter-info>\
             <error-code>13001</error-code><error-message>volume is busy</error-message>\
             <volume-key><volume-attributes><volume-id-attributes><name>v2</name>\
             </volume-id-attributes></volume-attributes></volume-key>\
             </volume-modify-iter-info></failure-list>\
             <next-tag>v2</next-tag><num-failed>1</num-failed><num-succeeded>1</num-succeeded>",
        ),
        crate::client::passed(
            "<success-list><volume-modify-iter-info>\
             <volume-key><volume-attributes><volume-id-attributes><name>v3</name>\
             </volume-id-attributes></volume-attributes></volume-key>\
             </volume-modify-iter-info></success-list>\
             <num-failed>0</num-failed><num-succeeded>1</num-succeeded>",
        ),
    ]);
    let query = VolumeAttributes {
        volume_id_attributes: Some(VolumeIdAttributes {
            owning_vserver_name: Some("svm1".into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let attributes = VolumeAttributes {
        volume_export_attributes: Some(VolumeExportAttributes {
            policy: Some("locked".into()),
        }),
        ..Default::default()
    };
    let res = client.volume_modify_all(query, attributes).unwrap();
    assert_eq!(res.pages, 2);
    assert_eq!(res.num_records, 3);
    let failed: Vec<&ModifyOutcome> = res.records.iter().filter(|o| !o.is_success()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].info().error_code, Some(13001));
    assert_eq!(
        failed[0].info().volume_key.as_ref().and_then(|k| k.name()),
        Some("v2")
    );

    let requests = client.transport().requests();
    assert!(requests[0].contains(
        "<attributes><volume-attributes><volume-export-attributes><policy>locked</policy>"
    ));
    assert!(requests[0].contains("<return-failure-list>true</return-failure-list>"));
    assert!(requests[1].contains("<tag>v2</tag>"));
}

#[test]
fn test_modify_iter_count_from_both_lists() {
    let e = treexml::Document::parse(
        "<results><num-failed>2</num-failed></results>".as_bytes(),
    )
    .unwrap()
    .root
    .unwrap();
    assert_eq!(VolumeModifyIter::num_records(&e).unwrap(), Some(2));
    let empty = treexml::Document::parse("<results/>".as_bytes())
        .unwrap()
        .root
        .unwrap();
    assert_eq!(VolumeModifyIter::num_records(&empty).unwrap(), None);
}
