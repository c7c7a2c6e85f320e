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

use std::error::Error as err;
use std::fmt;
use std::io::Error;
use std::time::Duration;

use native_tls::Error as NativeTlsError;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;
use treexml::Error as TreeXmlError;
use xml::writer::Error as XmlEmitterError;

pub type ZapiResult<T> = Result<T, ZapiError>;

/// Well known ZAPI errno values returned in the `errno` attribute of a
/// failed `<results>` element.
pub mod errno {
    pub const EAPIERROR: &str = "13001";
    pub const EAPIPRIVILEGE: &str = "13003";
    pub const EAPINOTFOUND: &str = "13005";
    pub const EVOLUMEDOESNOTEXIST: &str = "13040";
    pub const EINVALIDINPUTERROR: &str = "13115";
    pub const EOBJECTNOTFOUND: &str = "15661";
}

/// Custom error handling
#[derive(Debug)]
pub enum ZapiError {
    /// The server answered with `status="failed"`
    ApiError { errno: String, reason: String },
    DeadlineExceeded(Duration),
    DecodeError(String),
    Error(String),
    HttpError(ReqwestError),
    /// Anything other than 200 OK
    HttpStatus { status: u16, reason: String },
    IoError(Error),
    JsonError(JsonError),
    NativeTlsError(NativeTlsError),
    PageLimitExceeded(usize),
    TreeXmlError(TreeXmlError),
    XmlEmitterError(XmlEmitterError),
}

impl fmt::Display for ZapiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ZapiError::ApiError {
                ref errno,
                ref reason,
            } => write!(f, "zapi request failed ({}): {}", errno, reason),
            ZapiError::DeadlineExceeded(ref d) => {
                write!(f, "listing did not finish within {:?}", d)
            }
            ZapiError::DecodeError(ref e) => write!(f, "unable to decode response: {}", e),
            ZapiError::Error(ref e) => f.write_str(e),
            ZapiError::HttpError(ref e) => e.fmt(f),
            ZapiError::HttpStatus {
                ref status,
                ref reason,
            } => write!(f, "server returned {} {}", status, reason),
            ZapiError::IoError(ref e) => e.fmt(f),
            ZapiError::JsonError(ref e) => e.fmt(f),
            ZapiError::NativeTlsError(ref e) => e.fmt(f),
            ZapiError::PageLimitExceeded(ref n) => {
                write!(f, "listing still had a next-tag after {} pages", n)
            }
            ZapiError::TreeXmlError(ref e) => fmt::Display::fmt(e, f),
            ZapiError::XmlEmitterError(ref e) => e.fmt(f),
        }
    }
}

impl err for ZapiError {
    fn source(&self) -> Option<&(dyn err + 'static)> {
        match *self {
            ZapiError::ApiError { .. } => None,
            ZapiError::DeadlineExceeded(_) => None,
            ZapiError::DecodeError(_) => None,
            ZapiError::Error(_) => None,
            ZapiError::HttpError(ref e) => Some(e),
            ZapiError::HttpStatus { .. } => None,
            ZapiError::IoError(ref e) => Some(e),
            ZapiError::JsonError(ref e) => Some(e),
            ZapiError::NativeTlsError(ref e) => Some(e),
            ZapiError::PageLimitExceeded(_) => None,
            // treexml errors only implement Display
            ZapiError::TreeXmlError(_) => None,
            ZapiError::XmlEmitterError(ref e) => Some(e),
        }
    }
}

impl ZapiError {
    /// Create a new ZapiError with a String message
    pub fn new(err: String) -> ZapiError {
        ZapiError::Error(err)
    }

    /// Network failures and non-200 responses
    pub fn is_transport(&self) -> bool {
        match *self {
            ZapiError::HttpError(_) | ZapiError::HttpStatus { .. } => true,
            _ => false,
        }
    }

    /// The response body did not parse into the expected shape
    pub fn is_decode(&self) -> bool {
        match *self {
            ZapiError::DecodeError(_) | ZapiError::TreeXmlError(_) => true,
            _ => false,
        }
    }

    /// The errno the server attached to a failed request, if this is one
    pub fn errno(&self) -> Option<&str> {
        match *self {
            ZapiError::ApiError { ref errno, .. } => Some(errno),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self.errno() {
            Some(errno::EOBJECTNOTFOUND) | Some(errno::EVOLUMEDOESNOTEXIST) => true,
            _ => false,
        }
    }
}

impl From<Error> for ZapiError {
    fn from(err: Error) -> ZapiError {
        ZapiError::IoError(err)
    }
}

impl From<JsonError> for ZapiError {
    fn from(err: JsonError) -> ZapiError {
        ZapiError::JsonError(err)
    }
}

impl From<NativeTlsError> for ZapiError {
    fn from(err: NativeTlsError) -> ZapiError {
        ZapiError::NativeTlsError(err)
    }
}

impl From<String> for ZapiError {
    fn from(err: String) -> ZapiError {
        ZapiError::new(err)
    }
}

impl From<TreeXmlError> for ZapiError {
    fn from(err: TreeXmlError) -> ZapiError {
        ZapiError::TreeXmlError(err)
    }
}

impl From<ReqwestError> for ZapiError {
    fn from(err: ReqwestError) -> ZapiError {
        ZapiError::HttpError(err)
    }
}

impl From<XmlEmitterError> for ZapiError {
    fn from(err: XmlEmitterError) -> ZapiError {
        ZapiError::XmlEmitterError(err)
    }
}

#[test]
fn test_error_classification() {
    let e = ZapiError::HttpStatus {
        status: 401,
        reason: "Unauthorized".into(),
    };
    assert!(e.is_transport());
    assert!(!e.is_decode());
    assert_eq!(e.to_string(), "server returned 401 Unauthorized");

    let e = ZapiError::DecodeError("num-records".into());
    assert!(e.is_decode());
    assert!(!e.is_transport());

    let e = ZapiError::ApiError {
        errno: errno::EOBJECTNOTFOUND.into(),
        reason: "entry doesn't exist".into(),
    };
    assert_eq!(e.errno(), Some("15661"));
    assert!(e.is_not_found());
    assert!(!ZapiError::new("boom".into()).is_not_found());
}

#[test]
fn test_wrapped_errors_keep_source() {
    let e: ZapiError = Error::new(std::io::ErrorKind::NotFound, "cert.der").into();
    assert!(e.source().is_some());
    assert!(!e.is_transport());
    assert_eq!(e.to_string(), "cert.der");

    let e: ZapiError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(e.source().is_some());

    assert!(ZapiError::PageLimitExceeded(3).source().is_none());
}
