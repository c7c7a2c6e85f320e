//! ZAPI records are sparse: every field is optional and an unset field
//! must never reach the wire, not even as an empty tag.  The server reads
//! an empty `<size/>` inside a `<query>` as "size equals nothing", which is
//! a very different filter from no size predicate at all.
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
use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;

use crate::error::*;

pub use treexml::Element;
pub use xml::writer::EventWriter;
use uuid::Uuid;
use xml::writer::XmlEvent;

/// A ZAPI element with named, optional children.  Usually derived with
/// `#[derive(ZapiRecord)]`.
pub trait ZapiRecord: Sized {
    /// Element name of the record, ie `lun-info`
    const TAG: &'static str;

    /// Write the populated fields as children of the current element
    fn write_fields<W: Write>(&self, w: &mut EventWriter<W>) -> ZapiResult<()>;

    /// Read the record out of an element holding its fields
    fn from_element(e: &Element) -> ZapiResult<Self>;

    /// Write `<TAG>fields</TAG>`
    fn write_record<W: Write>(&self, w: &mut EventWriter<W>) -> ZapiResult<()> {
        start_element(w, Self::TAG, None)?;
        self.write_fields(w)?;
        end_element(w, Self::TAG)
    }
}

/// A value that can sit inside a record field
pub trait XmlField: Sized {
    fn write_field<W: Write>(&self, w: &mut EventWriter<W>, name: &str) -> ZapiResult<()>;
    fn read_field(e: &Element) -> ZapiResult<Self>;
}

/// Response for commands that return nothing but a status
#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "results")]
pub struct EmptyResponse {}

impl XmlField for String {
    fn write_field<W: Write>(&self, w: &mut EventWriter<W>, name: &str) -> ZapiResult<()> {
        start_element(w, name, Some(self))?;
        end_element(w, name)
    }

    fn read_field(e: &Element) -> ZapiResult<Self> {
        Ok(e.text.clone().unwrap_or_else(|| "".to_string()))
    }
}

macro_rules! parsed_field {
    ($($t:ty),*) => {
        $(
            impl XmlField for $t {
                fn write_field<W: Write>(
                    &self,
                    w: &mut EventWriter<W>,
                    name: &str,
                ) -> ZapiResult<()> {
                    start_element(w, name, Some(&self.to_string()))?;
                    end_element(w, name)
                }

                fn read_field(e: &Element) -> ZapiResult<Self> {
                    parse_text(e)
                }
            }
        )*
    };
}

parsed_field!(bool, u8, u16, u32, u64, i32, i64, Uuid);

fn parse_text<T>(e: &Element) -> ZapiResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let text = e.text.as_ref().map(|t| t.trim()).unwrap_or("");
    T::from_str(text).map_err(|err| {
        ZapiError::DecodeError(format!("parsing {} value {:?} failed: {}", e.name, text, err))
    })
}

pub fn start_element<W: Write>(
    w: &mut EventWriter<W>,
    element_name: &str,
    data: Option<&str>,
) -> ZapiResult<()> {
    w.write(XmlEvent::start_element(element_name))?;
    if let Some(chars) = data {
        w.write(XmlEvent::characters(chars))?;
    }
    Ok(())
}

pub fn end_element<W: Write>(w: &mut EventWriter<W>, name: &str) -> ZapiResult<()> {
    w.write(XmlEvent::end_element().name(name))?;
    Ok(())
}

/// `<name>fields</name>`, how a record is embedded as a field of another record
pub fn write_nested<W: Write, R: ZapiRecord>(
    w: &mut EventWriter<W>,
    name: &str,
    record: &R,
) -> ZapiResult<()> {
    start_element(w, name, None)?;
    record.write_fields(w)?;
    end_element(w, name)
}

/// `<name><TAG>fields</TAG></name>`, used by `query`, `desired-attributes`
/// and friends
pub fn write_wrapped<W: Write, R: ZapiRecord>(
    w: &mut EventWriter<W>,
    name: &str,
    record: &R,
) -> ZapiResult<()> {
    start_element(w, name, None)?;
    record.write_record(w)?;
    end_element(w, name)
}

/// `<name><item>..</item><item>..</item></name>`
pub fn write_list<W: Write, T: XmlField>(
    w: &mut EventWriter<W>,
    name: &str,
    item: &str,
    values: &[T],
) -> ZapiResult<()> {
    start_element(w, name, None)?;
    for v in values {
        v.write_field(w, item)?;
    }
    end_element(w, name)
}

pub fn find_child<'a>(e: &'a Element, tag: &str) -> Option<&'a Element> {
    e.find_child(|child| child.name == tag)
}

/// Text of a direct child.  An empty element reads as None.
pub fn child_text(e: &Element, tag: &str) -> Option<String> {
    find_child(e, tag)
        .and_then(|child| child.text.clone())
        .filter(|text| !text.is_empty())
}

pub fn read_field<T: XmlField>(e: &Element, name: &str) -> ZapiResult<Option<T>> {
    match find_child(e, name) {
        Some(child) => Ok(Some(T::read_field(child)?)),
        None => Ok(None),
    }
}

pub fn read_list<T: XmlField>(e: &Element, name: &str, item: &str) -> ZapiResult<Option<Vec<T>>> {
    match find_child(e, name) {
        Some(list) => {
            let values = list
                .children
                .iter()
                .filter(|child| child.name == item)
                .map(T::read_field)
                .collect::<ZapiResult<Vec<T>>>()?;
            Ok(Some(values))
        }
        None => Ok(None),
    }
}

pub fn read_wrapped<R: ZapiRecord>(e: &Element, name: &str) -> ZapiResult<Option<R>> {
    match find_child(e, name) {
        Some(wrapper) => {
            let inner = find_child(wrapper, R::TAG).ok_or_else(|| {
                ZapiError::DecodeError(format!("{} not found inside {}", R::TAG, name))
            })?;
            Ok(Some(R::from_element(inner)?))
        }
        None => Ok(None),
    }
}

/// Render a record on its own, mostly useful for logging and tests
pub fn to_xml_string<R: ZapiRecord>(record: &R) -> ZapiResult<String> {
    let mut output: Vec<u8> = Vec::new();
    {
        let mut writer = xml::writer::EmitterConfig::new()
            .write_document_declaration(false)
            .create_writer(&mut output);
        record.write_record(&mut writer)?;
    }
    String::from_utf8(output).map_err(|e| ZapiError::new(e.to_string()))
}

#[cfg(test)]
fn parse_element(data: &str) -> Element {
    treexml::Document::parse(data.as_bytes())
        .unwrap()
        .root
        .unwrap()
}

#[cfg(test)]
#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "widget-info")]
struct WidgetInfo {
    name: Option<String>,
    size: Option<u64>,
    #[zapi(rename = "is-online")]
    online: Option<bool>,
    #[zapi(list = "port-name")]
    ports: Option<Vec<String>>,
    owner: Option<WidgetOwner>,
}

#[cfg(test)]
#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
struct WidgetOwner {
    uid: Option<u32>,
}

#[test]
fn test_unset_fields_are_not_written() {
    let w = WidgetInfo {
        name: Some("w1".into()),
        ..Default::default()
    };
    let xml = to_xml_string(&w).unwrap();
    assert_eq!(xml, "<widget-info><name>w1</name></widget-info>");
    assert!(!xml.contains("size"));
    assert!(!xml.contains("is-online"));
}

#[test]
fn test_zero_values_are_written() {
    let w = WidgetInfo {
        size: Some(0),
        online: Some(false),
        ports: Some(vec![]),
        ..Default::default()
    };
    let xml = to_xml_string(&w).unwrap();
    assert!(xml.contains("<size>0</size>"));
    assert!(xml.contains("<is-online>false</is-online>"));
    assert!(xml.contains("<ports"));
    assert!(!xml.contains("<name"));
}

#[test]
fn test_nested_and_list_fields() {
    let w = WidgetInfo {
        ports: Some(vec!["e0a".into(), "e0b".into()]),
        owner: Some(WidgetOwner { uid: Some(7) }),
        ..Default::default()
    };
    let xml = to_xml_string(&w).unwrap();
    assert!(xml.contains("<ports><port-name>e0a</port-name><port-name>e0b</port-name></ports>"));
    assert!(xml.contains("<owner><uid>7</uid></owner>"));
}

#[test]
fn test_read_record() {
    let e = parse_element(
        r#"<widget-info>
            <name>w2</name>
            <size> 4096 </size>
            <is-online>true</is-online>
            <ports><port-name>e0c</port-name><junk>x</junk></ports>
            <owner><uid>0</uid></owner>
            <unknown-field>ignored</unknown-field>
        </widget-info>"#,
    );
    let w = WidgetInfo::from_element(&e).unwrap();
    assert_eq!(
        w,
        WidgetInfo {
            name: Some("w2".into()),
            size: Some(4096),
            online: Some(true),
            ports: Some(vec!["e0c".into()]),
            owner: Some(WidgetOwner { uid: Some(0) }),
        }
    );
}

#[test]
fn test_read_missing_fields_are_none() {
    let e = parse_element("<widget-info><name>w3</name></widget-info>");
    let w = WidgetInfo::from_element(&e).unwrap();
    assert_eq!(w.name, Some("w3".to_string()));
    assert_eq!(w.size, None);
    assert_eq!(w.ports, None);
    assert_eq!(w.owner, None);
}

#[test]
fn test_read_bad_value_is_decode_error() {
    let e = parse_element("<widget-info><size>lots</size></widget-info>");
    let err = WidgetInfo::from_element(&e).unwrap_err();
    assert!(err.is_decode(), "{:?}", err);
}

#[test]
fn test_escaped_text_round_trips() {
    let w = WidgetInfo {
        name: Some("a<b&c".into()),
        ..Default::default()
    };
    let xml = to_xml_string(&w).unwrap();
    assert!(xml.contains("a&lt;b&amp;c"));
    let back = WidgetInfo::from_element(&parse_element(&xml)).unwrap();
    assert_eq!(back.name, Some("a<b&c".to_string()));
}
