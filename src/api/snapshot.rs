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

use chrono::{DateTime, TimeZone, Utc};

#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "snapshot-info")]
pub struct SnapshotInfo {
    /// Seconds since the epoch
    pub access_time: Option<i64>,
    pub busy: Option<bool>,
    pub comment: Option<String>,
    pub cumulative_total: Option<u64>,
    pub dependency: Option<String>,
    pub name: Option<String>,
    pub snapshot_instance_uuid: Option<String>,
    pub state: Option<String>,
    pub total: Option<u64>,
    pub volume: Option<String>,
    pub vserver: Option<String>,
}

impl SnapshotInfo {
    pub fn access_time_utc(&self) -> Option<DateTime<Utc>> {
        self.access_time
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}

impl IterRecord for SnapshotInfo {
    const ITER_API: &'static str = "snapshot-get-iter";
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "snapshot-create")]
pub struct SnapshotCreate {
    #[zapi(rename = "async")]
    pub async_: Option<bool>,
    pub comment: Option<String>,
    pub snapshot: Option<String>,
    pub volume: Option<String>,
}

impl Command for SnapshotCreate {
    type Response = EmptyResponse;
}

#[derive(Clone, Debug, Default, ZapiRecord)]
#[zapi(tag = "snapshot-delete")]
pub struct SnapshotDelete {
    pub ignore_owners: Option<bool>,
    pub snapshot: Option<String>,
    pub volume: Option<String>,
}

impl Command for SnapshotDelete {
    type Response = EmptyResponse;
}

impl<T: Transport> ZapiClient<T> {
    /// Snapshots of one volume, oldest first as the server orders them
    pub fn snapshot_list(&self, volume: &str) -> ZapiResult<Vec<SnapshotInfo>> {
        self.get_all(Some(SnapshotInfo {
            volume: Some(volume.to_string()),
            ..Default::default()
        }))
    }

    pub fn snapshot_create(&self, volume: &str, name: &str, comment: Option<&str>) -> ZapiResult<()> {
        self.invoke(&SnapshotCreate {
            comment: comment.map(|c| c.to_string()),
            snapshot: Some(name.to_string()),
            volume: Some(volume.to_string()),
            ..Default::default()
        })?;
        Ok(())
    }

    pub fn snapshot_delete(&self, volume: &str, name: &str) -> ZapiResult<()> {
        self.invoke(&SnapshotDelete {
            snapshot: Some(name.to_string()),
            volume: Some(volume.to_string()),
            ..Default::default()
        })?;
        Ok(())
    }
}

#[test]
fn test_snapshot_list() {
    let client = crate::client::scripted_client(vec![
        crate::client::passed(
            "<attributes-list>\
             <snapshot-info><name>hourly.0</name><volume>vol1</volume>\
             <access-time>1546300800</access-time><busy>false</busy></snapshot-info>\
             <snapshot-info><name>hourly.1</name><volume>vol1</volume></snapshot-info>\
             </attributes-list><next-tag>vol1:hourly.1</next-tag><num-records>2</num-records>",
        ),
        crate::client::passed(
            "<attributes-list>\
             <snapshot-info><name>daily.0</name><volume>vol1</volume></snapshot-info>\
             </attributes-list><num-records>1</num-records>",
        ),
    ]);
    let snaps = client.snapshot_list("vol1").unwrap();
    let names: Vec<&str> = snaps
        .iter()
        .filter_map(|s| s.name.as_ref().map(|n| n.as_str()))
        .collect();
    assert_eq!(names, vec!["hourly.0", "hourly.1", "daily.0"]);
    assert_eq!(
        snaps[0].access_time_utc(),
        Some(Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(snaps[1].access_time_utc(), None);

    let requests = client.transport().requests();
    assert!(requests[0].contains("<query><snapshot-info><volume>vol1</volume></snapshot-info></query>"));
    // the query is repeated on every page
    assert!(requests[1].contains("<query><snapshot-info><volume>vol1</volume></snapshot-info></query>"));
    assert!(requests[1].contains("<tag>vol1:hourly.1</tag>"));
}

#[test]
fn test_snapshot_create_request() {
    let client = crate::client::scripted_client(vec![crate::client::passed("")]);
    client.snapshot_create("vol1", "backup", None).unwrap();
    let requests = client.transport().requests();
    assert!(requests[0].contains(
        "<snapshot-create><snapshot>backup</snapshot><volume>vol1</volume></snapshot-create>"
    ));
}

#[test]
fn test_snapshot_delete_busy() {
    let client = crate::client::scripted_client(vec![Ok(
        "<netapp><results status=\"failed\" errno=\"13023\" reason=\"Snapshot is busy\"/></netapp>"
            .to_string(),
    )]);
    let err = client.snapshot_delete("vol1", "hourly.0").unwrap_err();
    match err {
        ZapiError::ApiError { errno, reason } => {
            assert_eq!(errno, "13023");
            assert_eq!(reason, "Snapshot is busy");
        }
        e => panic!("unexpected error {:?}", e),
    }
}
