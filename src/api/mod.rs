//! Typed records and commands for the ONTAP objects this crate manages.
//! Each module adds its calls to `ZapiClient`.
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

pub mod export;
pub mod igroup;
pub mod lun;
pub mod net;
pub mod snapshot;
pub mod system;
pub mod volume;
pub mod vserver;

#[cfg(test)]
fn read_fixture(name: &str) -> String {
    use std::fs::File;
    use std::io::Read;

    let mut s = String::new();
    let mut f = File::open(format!("tests/zapi/{}", name)).unwrap();
    f.read_to_string(&mut s).unwrap();
    s
}
