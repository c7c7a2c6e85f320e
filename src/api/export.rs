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
use crate::client::ZapiClient;
use crate::error::*;
use crate::query::IterRecord;
use crate::transport::Transport;

/// One rule of an NFS export policy
#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "export-rule-info")]
pub struct ExportRuleInfo {
    pub anonymous_user_id: Option<String>,
    pub client_match: Option<String>,
    pub is_allow_set_uid_enabled: Option<bool>,
    pub policy_name: Option<String>,
    #[zapi(list = "access-protocol")]
    pub protocol: Option<Vec<String>>,
    #[zapi(list = "security-flavor")]
    pub ro_rule: Option<Vec<String>>,
    pub rule_index: Option<u32>,
    #[zapi(list = "security-flavor")]
    pub rw_rule: Option<Vec<String>>,
    #[zapi(list = "security-flavor")]
    pub super_user_security: Option<Vec<String>>,
    pub vserver_name: Option<String>,
}

impl IterRecord for ExportRuleInfo {
    const ITER_API: &'static str = "export-rule-get-iter";
}

impl<T: Transport> ZapiClient<T> {
    /// Rules of `policy` in rule index order
    pub fn export_rule_get_all(&self, policy: &str) -> ZapiResult<Vec<ExportRuleInfo>> {
        let mut rules = self.get_all(Some(ExportRuleInfo {
            policy_name: Some(policy.to_string()),
            ..Default::default()
        }))?;
        rules.sort_by_key(|r| r.rule_index);
        Ok(rules)
    }
}

#[test]
fn test_export_rule_parser() {
    use crate::envelope::decode;
    use crate::iter::attributes_list;

    let data = super::read_fixture("export_rule_get_iter.xml");
    let res = decode(&data).unwrap();
    let rules: Vec<ExportRuleInfo> = attributes_list(&res.element).unwrap();
    println!("rules: {:#?}", rules);
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].client_match, Some("10.0.0.0/8".to_string()));
    assert_eq!(rules[0].protocol, Some(vec!["nfs3".to_string(), "nfs4".to_string()]));
    assert_eq!(rules[0].rw_rule, Some(vec!["sys".to_string()]));
    assert_eq!(rules[0].super_user_security, Some(vec!["none".to_string()]));
    assert_eq!(rules[1].rule_index, Some(1));
    assert_eq!(rules[1].ro_rule, Some(vec!["any".to_string()]));
}

#[test]
fn test_export_rule_get_all_sorted() {
    let data = super::read_fixture("export_rule_get_iter.xml");
    let client = crate::client::scripted_client(vec![Ok(data)]);
    let rules = client.export_rule_get_all("default").unwrap();
    assert_eq!(rules[0].rule_index, Some(1));
    assert_eq!(rules[1].rule_index, Some(2));
    assert!(client.transport().requests()[0]
        .contains("<query><export-rule-info><policy-name>default</policy-name></export-rule-info></query>"));
}
