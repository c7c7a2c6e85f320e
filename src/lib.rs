//! Client for the NetApp ONTAP ZAPI XML management protocol.
//!
//! Every call is an XML command wrapped in a `<netapp>` envelope and posted
//! to the cluster (or a vserver) management endpoint.  Listing calls
//! (`*-get-iter`) are paginated with an opaque continuation tag; the
//! [`iter`] module drives them to completion and merges the pages.
//!
//! ```no_run
//! use netapp_zapi::{ZapiClient, ZapiConfig};
//! use netapp_zapi::api::lun::LunInfo;
//!
//! let config = ZapiConfig::from_file("zapi.json").unwrap();
//! let client = ZapiClient::new(config).unwrap();
//! let luns = client
//!     .lun_get_all(LunInfo {
//!         volume: Some("docker_vol1".into()),
//!         ..Default::default()
//!     })
//!     .unwrap();
//! ```
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

#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate zapi_derive;

// Lets the derive emit ::netapp_zapi paths from inside this crate too
extern crate self as netapp_zapi;

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod iter;
pub mod query;
pub mod record;
pub mod transport;

pub use crate::client::{Command, ZapiClient};
pub use crate::config::ZapiConfig;
pub use crate::envelope::{Envelope, Outcome, ResultStatus};
pub use crate::error::{ZapiError, ZapiResult};
pub use crate::iter::{IterCommand, IterLimits, IterResult, Page};
pub use crate::query::{GetIter, IterRecord};
pub use crate::record::{XmlField, ZapiRecord};
pub use crate::transport::{HttpTransport, Transport};
pub use zapi_derive::ZapiRecord;
