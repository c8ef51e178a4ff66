//! Local inspection: decode a label, show the last recorded request.

use crate::{
    label::{self, LabelMatch},
    staffbase::RequestKind,
    storage::Storage,
};

use super::print_json;

pub(super) fn cmd_label(text: &str) -> Result<(), String> {
    match label::decode(text) {
        LabelMatch::Matched(label) => print_json(&label),
        LabelMatch::Unmatched => Err("not a managed channel label".to_string()),
    }
}

pub(super) fn cmd_debug(storage: &Storage, kind: Option<RequestKind>) -> Result<(), String> {
    let request = storage
        .latest_request(kind)
        .map_err(|e| format!("failed to read request log: {e}"))?;

    match request {
        Some(request) => print_json(&request),
        None => {
            let what = kind.map_or("requests", |k| match k {
                RequestKind::General => "general requests",
                RequestKind::TaskList => "task-list requests",
                RequestKind::Task => "task requests",
            });
            println!("No {what} recorded");
            Ok(())
        }
    }
}
