//! The paginated listing protocol shared by every `*-get-iter` call.
//!
//! Each page is one request/response round trip.  The response carries an
//! opaque `next-tag` which has to be sent back verbatim as `tag` to get the
//! following page, so pages are fetched strictly one after the other.
//! Iteration stops when a page has no `next-tag`, or when it declares
//! `num-records` of 0.
//!
//! Any transport or decode failure aborts the whole listing.  Records from
//! the pages already fetched are dropped with the error; there is no way to
//! resume from the middle of a listing.
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
use std::time::{Duration, Instant};

use crate::envelope::{decode, Envelope, ResultStatus};
use crate::error::*;
use crate::record::{child_text, find_child, read_field, Element, ZapiRecord};
use crate::transport::Transport;

use log::{debug, trace, warn};

/// A command that can be paged through with `tag`/`next-tag`
pub trait IterCommand: ZapiRecord {
    type Record;

    /// Set the continuation cursor.  None on the first page.
    fn set_tag(&mut self, tag: Option<String>);

    /// Pull this page's records out of the `<results>` element
    fn records(results: &Element) -> ZapiResult<Vec<Self::Record>>;

    /// How many records the page claims to hold
    fn num_records(results: &Element) -> ZapiResult<Option<u64>> {
        read_field(results, "num-records")
    }
}

/// One round trip worth of a listing
#[derive(Debug)]
pub struct Page<R> {
    pub status: ResultStatus,
    pub records: Vec<R>,
    pub next_tag: Option<String>,
    pub num_records: Option<u64>,
}

impl<R> Page<R> {
    pub fn is_last(&self) -> bool {
        self.next_tag.is_none() || self.num_records == Some(0)
    }
}

/// The merged result of a whole listing.  `status` is the status of the
/// last page fetched and `num_records` is the number of records actually
/// collected, whatever the individual pages claimed.
#[derive(Debug)]
pub struct IterResult<R> {
    pub status: ResultStatus,
    pub records: Vec<R>,
    pub num_records: usize,
    pub pages: usize,
}

impl<R> IterResult<R> {
    /// The records, or an ApiError if the last page failed
    pub fn into_records(self) -> ZapiResult<Vec<R>> {
        self.status.check()?;
        Ok(self.records)
    }
}

/// Bounds on a single listing call
#[derive(Clone, Debug)]
pub struct IterLimits {
    /// Give up when a server keeps handing out cursors
    pub max_pages: Option<usize>,
    /// Overall time budget, checked before every page
    pub deadline: Option<Duration>,
    /// Abort on the first failed page.  When false only the last page's
    /// status is reported and callers have to inspect IterResult::status.
    pub abort_on_failed_page: bool,
}

impl Default for IterLimits {
    fn default() -> Self {
        IterLimits {
            max_pages: Some(10_000),
            deadline: Some(Duration::from_secs(600)),
            abort_on_failed_page: true,
        }
    }
}

impl IterLimits {
    pub fn unbounded() -> Self {
        IterLimits {
            max_pages: None,
            deadline: None,
            abort_on_failed_page: true,
        }
    }
}

/// Records inside `<attributes-list>`.  A page without the element has no
/// records.
pub fn attributes_list<R: ZapiRecord>(results: &Element) -> ZapiResult<Vec<R>> {
    let list = match find_child(results, "attributes-list") {
        Some(list) => list,
        None => return Ok(Vec::new()),
    };
    let mut records = Vec::with_capacity(list.children.len());
    for child in &list.children {
        if child.name == R::TAG {
            records.push(R::from_element(child)?);
        } else {
            warn!("unexpected {} in attributes-list of {}", child.name, R::TAG);
        }
    }
    Ok(records)
}

/// Fetch the page at `tag` in exactly one round trip
pub fn fetch_page<T, C>(
    transport: &T,
    envelope: &Envelope,
    command: &mut C,
    tag: Option<&str>,
) -> ZapiResult<Page<C::Record>>
where
    T: Transport,
    C: IterCommand,
{
    command.set_tag(tag.map(|t| t.to_string()));
    let req = envelope.encode(command)?;
    // The body is fully read inside send, nothing is held open past here
    let data = transport.send(req)?;

    let results = decode(&data)?;
    let records = C::records(&results.element)?;
    let num_records = C::num_records(&results.element)?;
    let next_tag = child_text(&results.element, "next-tag");

    Ok(Page {
        status: results.status,
        records,
        next_tag,
        num_records,
    })
}

// Call local, dropped when iterate returns
struct IterState<R> {
    cursor: Option<String>,
    records: Vec<R>,
    status: ResultStatus,
    pages: usize,
    done: bool,
}

/// Drive `command` through every page and merge the results
pub fn iterate<T, C>(
    transport: &T,
    envelope: &Envelope,
    mut command: C,
    limits: &IterLimits,
) -> ZapiResult<IterResult<C::Record>>
where
    T: Transport,
    C: IterCommand,
{
    let started = Instant::now();
    let mut state = IterState {
        cursor: None,
        records: Vec::new(),
        status: ResultStatus::passed(),
        pages: 0,
        done: false,
    };

    while !state.done {
        if let Some(max_pages) = limits.max_pages {
            if state.pages >= max_pages {
                return Err(ZapiError::PageLimitExceeded(max_pages));
            }
        }
        if let Some(deadline) = limits.deadline {
            if started.elapsed() >= deadline {
                return Err(ZapiError::DeadlineExceeded(deadline));
            }
        }

        let page = fetch_page(transport, envelope, &mut command, state.cursor.as_deref())?;
        state.pages += 1;
        trace!(
            "{} page {}: {} records, num-records {:?}, next-tag {:?}",
            C::TAG,
            state.pages,
            page.records.len(),
            page.num_records,
            page.next_tag
        );
        if limits.abort_on_failed_page {
            page.status.check()?;
        }

        state.done = page.is_last();
        let Page {
            status,
            records,
            next_tag,
            ..
        } = page;
        state.records.extend(records);
        state.status = status;
        state.cursor = next_tag;
    }

    debug!(
        "{} finished: {} records in {} pages",
        C::TAG,
        state.records.len(),
        state.pages
    );
    Ok(IterResult {
        status: state.status,
        num_records: state.records.len(),
        records: state.records,
        pages: state.pages,
    })
}

#[cfg(test)]
use crate::envelope::Outcome;
#[cfg(test)]
use crate::query::{GetIter, IterRecord};
#[cfg(test)]
use crate::transport::ScriptedTransport;

#[cfg(test)]
#[derive(Clone, Debug, Default, PartialEq, ZapiRecord)]
#[zapi(tag = "item-info")]
struct ItemInfo {
    name: Option<String>,
}

#[cfg(test)]
impl IterRecord for ItemInfo {
    const ITER_API: &'static str = "item-get-iter";
}

#[cfg(test)]
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
fn results(status: &str, names: &[&str], next_tag: Option<&str>, num: Option<&str>) -> String {
    let mut body = String::new();
    if !names.is_empty() {
        body.push_str("<attributes-list>");
        for n in names {
            body.push_str(&format!("<item-info><name>{}</name></item-info>", n));
        }
        body.push_str("</attributes-list>");
    }
    if let Some(t) = next_tag {
        body.push_str(&format!("<next-tag>{}</next-tag>", escape(t)));
    }
    if let Some(n) = num {
        body.push_str(&format!("<num-records>{}</num-records>", n));
    }
    format!(
        "<?xml version='1.0' encoding='UTF-8' ?>\
         <netapp version='1.21' xmlns='http://www.netapp.com/filer/admin'>\
         <results {}>{}</results></netapp>",
        status, body
    )
}

#[cfg(test)]
fn page(names: &[&str], next_tag: Option<&str>) -> ZapiResult<String> {
    let num = names.len().to_string();
    Ok(results("status=\"passed\"", names, next_tag, Some(num.as_str())))
}

#[cfg(test)]
fn failed(errno: &str, reason: &str, next_tag: Option<&str>) -> ZapiResult<String> {
    let status = format!("status=\"failed\" errno=\"{}\" reason=\"{}\"", errno, reason);
    Ok(results(&status, &[], next_tag, None))
}

#[cfg(test)]
fn names(result: &IterResult<ItemInfo>) -> Vec<String> {
    result
        .records
        .iter()
        .map(|r| r.name.clone().unwrap_or_default())
        .collect()
}

#[cfg(test)]
fn run(
    transport: &ScriptedTransport,
    limits: &IterLimits,
) -> ZapiResult<IterResult<ItemInfo>> {
    let envelope = Envelope::with_platform("svm1", "Linux x86_64");
    iterate(transport, &envelope, GetIter::<ItemInfo>::new(), limits)
}

#[cfg(test)]
fn sent_tag(request: &str) -> Option<String> {
    let root = treexml::Document::parse(request.as_bytes())
        .unwrap()
        .root
        .unwrap();
    let cmd = find_child(&root, "item-get-iter").unwrap();
    find_child(cmd, "tag").map(|t| t.text.clone().unwrap_or_default())
}

#[test]
fn test_three_pages_are_concatenated() {
    let transport = ScriptedTransport::new(vec![
        page(&["x1", "x2"], Some("A")),
        page(&["x3"], Some("B")),
        Ok(results(
            "status=\"passed\" reason=\"last\"",
            &["x4", "x5"],
            None,
            Some("2"),
        )),
    ]);
    let result = run(&transport, &IterLimits::default()).unwrap();
    assert_eq!(names(&result), vec!["x1", "x2", "x3", "x4", "x5"]);
    assert_eq!(result.num_records, 5);
    assert_eq!(result.pages, 3);
    assert_eq!(transport.round_trips(), 3);
    assert_eq!(result.status.reason.as_ref().map(|s| s.as_str()), Some("last"));

    let requests = transport.requests();
    assert_eq!(sent_tag(&requests[0]), None);
    assert_eq!(sent_tag(&requests[1]), Some("A".to_string()));
    assert_eq!(sent_tag(&requests[2]), Some("B".to_string()));
    assert!(requests.iter().all(|r| r.contains("vfiler=\"svm1\"")));
}

#[test]
fn test_concatenation_for_any_page_count() {
    for n in 1..6 {
        let mut responses = Vec::new();
        let mut expected = Vec::new();
        for p in 0..n {
            let page_names: Vec<String> = (0..p).map(|i| format!("p{}r{}", p, i)).collect();
            expected.extend(page_names.clone());
            let refs: Vec<&str> = page_names.iter().map(|s| s.as_str()).collect();
            let tag = format!("t{}", p);
            let next = if p + 1 == n { None } else { Some(tag.as_str()) };
            // declared count left out so empty pages do not short-circuit
            responses.push(Ok(results("status=\"passed\"", &refs, next, None)));
        }
        let transport = ScriptedTransport::new(responses);
        let result = run(&transport, &IterLimits::default()).unwrap();
        assert_eq!(names(&result), expected);
        assert_eq!(transport.round_trips(), n);
    }
}

#[test]
fn test_single_empty_page() {
    let transport = ScriptedTransport::new(vec![page(&[], None)]);
    let result = run(&transport, &IterLimits::default()).unwrap();
    assert!(result.records.is_empty());
    assert_eq!(result.num_records, 0);
    assert_eq!(transport.round_trips(), 1);
}

#[test]
fn test_no_cursor_means_one_fetch() {
    let transport = ScriptedTransport::new(vec![
        Ok(results("status=\"passed\"", &["x1", "x2"], None, Some("5"))),
        page(&["never"], None),
    ]);
    let result = run(&transport, &IterLimits::default()).unwrap();
    assert_eq!(transport.round_trips(), 1);
    assert_eq!(names(&result), vec!["x1", "x2"]);
    // recomputed, not trusted from the server
    assert_eq!(result.num_records, 2);
}

#[test]
fn test_zero_count_stops_despite_cursor() {
    let transport = ScriptedTransport::new(vec![
        Ok(results("status=\"passed\"", &[], Some("A"), Some("0"))),
        page(&["never"], None),
    ]);
    let result = run(&transport, &IterLimits::default()).unwrap();
    assert_eq!(transport.round_trips(), 1);
    assert!(result.records.is_empty());
}

#[test]
fn test_missing_count_relies_on_cursor() {
    let transport = ScriptedTransport::new(vec![
        Ok(results("status=\"passed\"", &["x1"], Some("A"), None)),
        Ok(results("status=\"passed\"", &["x2"], None, None)),
    ]);
    let result = run(&transport, &IterLimits::default()).unwrap();
    assert_eq!(transport.round_trips(), 2);
    assert_eq!(names(&result), vec!["x1", "x2"]);
}

#[test]
fn test_misreported_counts_are_reconciled() {
    let transport = ScriptedTransport::new(vec![
        Ok(results("status=\"passed\"", &["x1", "x2"], Some("A"), Some("7"))),
        Ok(results("status=\"passed\"", &["x3"], None, Some("1000"))),
    ]);
    let result = run(&transport, &IterLimits::default()).unwrap();
    assert_eq!(result.num_records, 3);
    assert_eq!(result.records.len(), 3);
}

#[test]
fn test_transport_error_aborts() {
    let transport = ScriptedTransport::new(vec![
        page(&["x1", "x2"], Some("A")),
        Err(ZapiError::HttpStatus {
            status: 503,
            reason: "Service Unavailable".into(),
        }),
        page(&["x3"], None),
    ]);
    // the caller gets no partial data back, only the error
    let err = run(&transport, &IterLimits::default()).unwrap_err();
    assert!(err.is_transport());
    assert_eq!(transport.round_trips(), 2);
}

#[test]
fn test_malformed_page_aborts() {
    let transport = ScriptedTransport::new(vec![
        page(&["x1"], Some("A")),
        Ok("<netapp><results status=\"passed\"><attributes-list>".to_string()),
        page(&["x3"], None),
    ]);
    let err = run(&transport, &IterLimits::default()).unwrap_err();
    assert!(err.is_decode(), "{:?}", err);
    assert_eq!(transport.round_trips(), 2);
}

#[test]
fn test_bad_count_aborts() {
    let transport = ScriptedTransport::new(vec![Ok(results(
        "status=\"passed\"",
        &["x1"],
        Some("A"),
        Some("many"),
    ))]);
    let err = run(&transport, &IterLimits::default()).unwrap_err();
    assert!(err.is_decode(), "{:?}", err);
}

#[test]
fn test_failed_page_aborts_by_default() {
    let transport = ScriptedTransport::new(vec![
        page(&["x1"], Some("A")),
        failed("13001", "internal error", Some("B")),
        page(&["x3"], None),
    ]);
    match run(&transport, &IterLimits::default()) {
        Err(ZapiError::ApiError { errno, reason }) => {
            assert_eq!(errno, "13001");
            assert_eq!(reason, "internal error");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
    assert_eq!(transport.round_trips(), 2);
}

#[test]
fn test_lenient_final_status_wins() {
    let limits = IterLimits {
        abort_on_failed_page: false,
        ..IterLimits::default()
    };

    // an early failure is hidden by a later success
    let transport = ScriptedTransport::new(vec![
        failed("13001", "hiccup", Some("A")),
        page(&["x2"], None),
    ]);
    let result = run(&transport, &limits).unwrap();
    assert!(result.status.is_passed());
    assert_eq!(names(&result), vec!["x2"]);

    // and a failure on the last page is reported
    let transport = ScriptedTransport::new(vec![
        page(&["x1"], Some("A")),
        failed("15661", "gone", None),
    ]);
    let result = run(&transport, &limits).unwrap();
    assert_eq!(result.status.outcome, Outcome::Failed);
    assert_eq!(result.status.errno.as_ref().map(|s| s.as_str()), Some("15661"));
    assert_eq!(names(&result), vec!["x1"]);
    assert!(result.into_records().unwrap_err().is_not_found());
}

#[test]
fn test_page_limit() {
    let transport = ScriptedTransport::new(vec![
        page(&["x1"], Some("A")),
        page(&["x2"], Some("B")),
        page(&["x3"], Some("C")),
    ]);
    let limits = IterLimits {
        max_pages: Some(2),
        ..IterLimits::default()
    };
    match run(&transport, &limits) {
        Err(ZapiError::PageLimitExceeded(2)) => {}
        other => panic!("expected PageLimitExceeded, got {:?}", other),
    }
    assert_eq!(transport.round_trips(), 2);
}

#[test]
fn test_page_limit_not_hit_on_exact_count() {
    let transport = ScriptedTransport::new(vec![
        page(&["x1"], Some("A")),
        page(&["x2"], None),
    ]);
    let limits = IterLimits {
        max_pages: Some(2),
        ..IterLimits::default()
    };
    assert_eq!(run(&transport, &limits).unwrap().pages, 2);
}

#[test]
fn test_deadline() {
    let transport = ScriptedTransport::new(vec![page(&["x1"], None)]);
    let limits = IterLimits {
        deadline: Some(Duration::from_secs(0)),
        ..IterLimits::default()
    };
    match run(&transport, &limits) {
        Err(ZapiError::DeadlineExceeded(_)) => {}
        other => panic!("expected DeadlineExceeded, got {:?}", other),
    }
    assert_eq!(transport.round_trips(), 0);
}

#[test]
fn test_cursor_is_echoed_verbatim() {
    let cursor = "<lun-get-iter-key-td><key-0>svm1</key-0><key-1>/vol/a&b/lun 0</key-1></lun-get-iter-key-td>";
    let transport = ScriptedTransport::new(vec![
        page(&["x1"], Some(cursor)),
        page(&["x2"], None),
    ]);
    run(&transport, &IterLimits::unbounded()).unwrap();
    assert_eq!(sent_tag(&transport.requests()[1]), Some(cursor.to_string()));
}
