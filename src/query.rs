//! Query-by-example.  A listing command carries two sparse instances of
//! the record it lists: `query`, whose populated fields are ANDed equality
//! predicates, and `desired-attributes`, whose populated fields name the
//! attributes the server should send back.
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
use std::io::Write;

use crate::error::*;
use crate::iter::{attributes_list, IterCommand};
use crate::record::{
    read_field, read_wrapped, write_wrapped, Element, EventWriter, XmlField, ZapiRecord,
};

/// A record that can be listed with a `*-get-iter` call
pub trait IterRecord: ZapiRecord {
    /// ie `lun-get-iter` for `lun-info`
    const ITER_API: &'static str;
}

/// The generic `*-get-iter` command
#[derive(Clone, Debug, PartialEq)]
pub struct GetIter<R> {
    pub max_records: Option<u32>,
    /// Continuation cursor.  Managed by the iterator engine.
    pub tag: Option<String>,
    pub query: Option<R>,
    pub desired_attributes: Option<R>,
}

impl<R> Default for GetIter<R> {
    fn default() -> Self {
        GetIter {
            max_records: None,
            tag: None,
            query: None,
            desired_attributes: None,
        }
    }
}

impl<R: IterRecord> GetIter<R> {
    pub fn new() -> Self {
        GetIter::default()
    }

    pub fn max_records(mut self, max_records: u32) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub fn query(mut self, query: R) -> Self {
        self.query = Some(query);
        self
    }

    pub fn desired_attributes(mut self, desired: R) -> Self {
        self.desired_attributes = Some(desired);
        self
    }
}

impl<R: IterRecord> ZapiRecord for GetIter<R> {
    const TAG: &'static str = R::ITER_API;

    fn write_fields<W: Write>(&self, w: &mut EventWriter<W>) -> ZapiResult<()> {
        if let Some(ref desired) = self.desired_attributes {
            write_wrapped(w, "desired-attributes", desired)?;
        }
        if let Some(ref max_records) = self.max_records {
            max_records.write_field(w, "max-records")?;
        }
        if let Some(ref query) = self.query {
            write_wrapped(w, "query", query)?;
        }
        if let Some(ref tag) = self.tag {
            tag.write_field(w, "tag")?;
        }
        Ok(())
    }

    fn from_element(e: &Element) -> ZapiResult<Self> {
        Ok(GetIter {
            max_records: read_field(e, "max-records")?,
            tag: read_field(e, "tag")?,
            query: read_wrapped(e, "query")?,
            desired_attributes: read_wrapped(e, "desired-attributes")?,
        })
    }
}

impl<R: IterRecord> IterCommand for GetIter<R> {
    type Record = R;

    fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    fn records(results: &Element) -> ZapiResult<Vec<R>> {
        attributes_list(results)
    }
}

#[cfg(test)]
#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "qtree-info")]
struct QtreeInfo {
    qtree: Option<String>,
    volume: Option<String>,
    oplocks: Option<String>,
    security_style: Option<String>,
}

#[cfg(test)]
impl IterRecord for QtreeInfo {
    const ITER_API: &'static str = "qtree-list-iter";
}

#[test]
fn test_query_and_projection() {
    let cmd = GetIter::new()
        .max_records(100)
        .query(QtreeInfo {
            volume: Some("vol1".into()),
            ..Default::default()
        })
        .desired_attributes(QtreeInfo {
            qtree: Some(String::new()),
            ..Default::default()
        });
    let xml = crate::record::to_xml_string(&cmd).unwrap();
    println!("request {}", xml);
    assert!(xml.starts_with("<qtree-list-iter>"));
    assert!(xml.contains("<query><qtree-info><volume>vol1</volume></qtree-info></query>"));
    assert!(xml.contains("<desired-attributes><qtree-info><qtree"));
    assert!(xml.contains("<max-records>100</max-records>"));
    // first page never carries a cursor
    assert!(!xml.contains("<tag"));
    assert!(!xml.contains("oplocks"));
    assert!(!xml.contains("security-style"));
}

#[test]
fn test_empty_get_iter() {
    let cmd: GetIter<QtreeInfo> = GetIter::new();
    let xml = crate::record::to_xml_string(&cmd).unwrap();
    assert!(!xml.contains("query"));
    assert!(!xml.contains("desired-attributes"));
    assert!(!xml.contains("max-records"));
}

#[test]
fn test_get_iter_reads_back() {
    let mut cmd = GetIter::new().query(QtreeInfo {
        qtree: Some("q1".into()),
        ..Default::default()
    });
    cmd.set_tag(Some("cursor-1".into()));
    let xml = crate::record::to_xml_string(&cmd).unwrap();
    let e = treexml::Document::parse(xml.as_bytes())
        .unwrap()
        .root
        .unwrap();
    let back: GetIter<QtreeInfo> = GetIter::from_element(&e).unwrap();
    assert_eq!(back, cmd);
}
