//! Every ZAPI request is a single command element inside a `<netapp>`
//! wrapper and every response is a single `<results>` element inside the
//! same wrapper.
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
use crate::error::*;
use crate::record::{end_element, Element, ZapiRecord};

use log::debug;
use treexml::Document;
use xml::writer::{EventWriter, XmlEvent};

static ZAPI_NS: &str = "http://www.netapp.com/filer/admin";
pub static ZAPI_VERSION: &str = "1.21";
static NMSDK_VERSION: &str = "9.4";
static NMSDK_APP: &str = "netapp-zapi";

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Passed,
    Failed,
}

/// The status attributes every `<results>` element carries
#[derive(Clone, Debug, PartialEq)]
pub struct ResultStatus {
    pub outcome: Outcome,
    pub reason: Option<String>,
    pub errno: Option<String>,
}

impl ResultStatus {
    pub fn passed() -> Self {
        ResultStatus {
            outcome: Outcome::Passed,
            reason: None,
            errno: None,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    /// Turn a failed status into an ApiError
    pub fn check(&self) -> ZapiResult<()> {
        match self.outcome {
            Outcome::Passed => Ok(()),
            Outcome::Failed => Err(ZapiError::ApiError {
                errno: self.errno.clone().unwrap_or_default(),
                reason: self.reason.clone().unwrap_or_default(),
            }),
        }
    }

    fn from_element(results: &Element) -> ZapiResult<Self> {
        let outcome = match results.attributes.get("status").map(|s| s.as_str()) {
            Some("passed") => Outcome::Passed,
            Some("failed") => Outcome::Failed,
            Some(other) => {
                return Err(ZapiError::DecodeError(format!(
                    "unknown results status {}",
                    other
                )))
            }
            None => {
                return Err(ZapiError::DecodeError(
                    "results element has no status".into(),
                ))
            }
        };
        Ok(ResultStatus {
            outcome,
            reason: results.attributes.get("reason").cloned(),
            errno: results.attributes.get("errno").cloned(),
        })
    }
}

/// A decoded response.  The payload stays a tree because its shape
/// depends on the command that was sent.
#[derive(Debug)]
pub struct Results {
    pub status: ResultStatus,
    pub element: Element,
}

impl Results {
    pub fn payload<T: ZapiRecord>(&self) -> ZapiResult<T> {
        T::from_element(&self.element)
    }
}

/// The outer `<netapp>` element for one client session
#[derive(Clone, Debug)]
pub struct Envelope {
    vfiler: Option<String>,
    platform: String,
}

impl Envelope {
    pub fn new(vserver: &str) -> ZapiResult<Self> {
        // Get information about the kernel to tell netapp about
        let sys_info = uname::uname()?;
        let platform = format!("{} {}", sys_info.sysname, sys_info.machine);
        Ok(Envelope::with_platform(vserver, &platform))
    }

    pub fn with_platform(vserver: &str, platform: &str) -> Self {
        Envelope {
            vfiler: if vserver.is_empty() {
                None
            } else {
                Some(vserver.to_string())
            },
            platform: platform.to_string(),
        }
    }

    pub fn vfiler(&self) -> Option<&str> {
        self.vfiler.as_ref().map(|s| s.as_str())
    }

    pub fn encode<C: ZapiRecord>(&self, command: &C) -> ZapiResult<Vec<u8>> {
        let mut output: Vec<u8> = Vec::new();
        {
            let mut w = EventWriter::new(&mut output);
            let mut e = XmlEvent::start_element("netapp")
                .default_ns(ZAPI_NS)
                .attr("version", ZAPI_VERSION)
                .attr("nmsdk_version", NMSDK_VERSION)
                .attr("nmsdk_platform", &self.platform)
                .attr("nmsdk_language", "rust")
                .attr("nmsdk_app", NMSDK_APP);
            // The server treats vfiler="" differently from no vfiler at all
            if let Some(ref vfiler) = self.vfiler {
                e = e.attr("vfiler", vfiler);
            }
            w.write(e)?;
            command.write_record(&mut w)?;
            end_element(&mut w, "netapp")?;
        }
        Ok(output)
    }
}

pub fn decode(data: &str) -> ZapiResult<Results> {
    let doc = Document::parse(data.as_bytes())?;
    let root = doc
        .root
        .ok_or_else(|| ZapiError::DecodeError(format!("root xml not found for {}", data)))?;
    if root.name != "netapp" {
        return Err(ZapiError::DecodeError(format!(
            "expected netapp root element, found {}",
            root.name
        )));
    }
    let element = root
        .children
        .into_iter()
        .find(|child| child.name == "results")
        .ok_or_else(|| ZapiError::DecodeError("results tag not found".into()))?;
    let status = ResultStatus::from_element(&element)?;
    debug!("decoded results status: {:?}", status);

    Ok(Results { status, element })
}

#[cfg(test)]
#[derive(Debug, Default, ZapiRecord)]
#[zapi(tag = "volume-destroy")]
struct DestroyRequest {
    name: Option<String>,
    unmount_and_offline: Option<bool>,
}

#[test]
fn test_encode_without_scope() {
    let envelope = Envelope::with_platform("", "Linux x86_64");
    let req = DestroyRequest {
        name: Some("vol1".into()),
        ..Default::default()
    };
    let out = String::from_utf8(envelope.encode(&req).unwrap()).unwrap();
    println!("request {}", out);
    assert!(out.starts_with("<?xml"));
    assert!(out.contains("<netapp "));
    assert!(out.contains("xmlns=\"http://www.netapp.com/filer/admin\""));
    assert!(out.contains("version=\"1.21\""));
    assert!(!out.contains("vfiler"));
    assert!(out.contains("<volume-destroy><name>vol1</name></volume-destroy></netapp>"));
    assert!(!out.contains("unmount-and-offline"));
}

#[test]
fn test_encode_with_scope() {
    let envelope = Envelope::with_platform("acct1", "Linux x86_64");
    assert_eq!(envelope.vfiler(), Some("acct1"));
    let out = String::from_utf8(envelope.encode(&DestroyRequest::default()).unwrap()).unwrap();
    assert!(out.contains("vfiler=\"acct1\""));
}

#[test]
fn test_decode_passed() {
    let res = decode(
        r#"<?xml version='1.0' encoding='UTF-8' ?>
        <netapp version='1.21' xmlns='http://www.netapp.com/filer/admin'>
            <results status="passed"><num-records>0</num-records></results>
        </netapp>"#,
    )
    .unwrap();
    assert!(res.status.is_passed());
    assert!(res.status.check().is_ok());
    assert_eq!(res.element.name, "results");
}

#[test]
fn test_decode_failed() {
    let res = decode(
        r#"<netapp version='1.21' xmlns='http://www.netapp.com/filer/admin'>
            <results status="failed" errno="13005" reason="Unable to find API: lun-get-itr"/>
        </netapp>"#,
    )
    .unwrap();
    assert_eq!(res.status.outcome, Outcome::Failed);
    assert_eq!(res.status.errno.as_ref().map(|s| s.as_str()), Some("13005"));
    match res.status.check() {
        Err(ZapiError::ApiError { errno, reason }) => {
            assert_eq!(errno, "13005");
            assert_eq!(reason, "Unable to find API: lun-get-itr");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[test]
fn test_decode_errors() {
    assert!(decode("<netapp><results status=\"passed\">").unwrap_err().is_decode());
    assert!(decode("<netapp></netapp>").unwrap_err().is_decode());
    assert!(decode("<html><body>login</body></html>").unwrap_err().is_decode());
    assert!(decode("<netapp><results status=\"maybe\"/></netapp>")
        .unwrap_err()
        .is_decode());
}
