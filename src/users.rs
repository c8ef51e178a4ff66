//! Matching uploaded ids to directory users.
//!
//! The directory has no lookup-by-attribute endpoint, so it is scanned page
//! by page. One scan serves a whole upload and stops as soon as every id has
//! a match.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::{
    model::{MatchedUser, Verification},
    staffbase::{self, PageRequest, Staffbase, UserRecord},
};

/// Resolve ids against the user attribute `attribute_key`.
///
/// Ids without a matching user are reported, not treated as errors. The
/// first user carrying an id wins.
pub fn verify(
    api: &impl Staffbase,
    attribute_key: &str,
    page_size: usize,
    ids: &[String],
) -> staffbase::Result<Verification> {
    let page_size = page_size.max(1);
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut matches: HashMap<String, UserRecord> = HashMap::new();
    let mut offset = 0;
    let mut pages = 0;

    while matches.len() < wanted.len() {
        pages += 1;
        let page = api.list_users(PageRequest {
            limit: page_size,
            offset,
        })?;
        let len = page.len();
        for user in page {
            if let Some(value) = user.attribute(attribute_key)
                && wanted.contains(value)
                && !matches.contains_key(value)
            {
                matches.insert(value.to_string(), user);
            }
        }
        if len < page_size {
            break;
        }
        offset += page_size;
    }
    debug!(pages, "scanned user directory");

    let mut verification = Verification::default();
    for id in ids {
        match matches.get(id) {
            Some(user) => verification.found_users.push(MatchedUser {
                id: user.id.clone(),
                csv_id: id.clone(),
                name: user.display_name(),
            }),
            None => verification.not_found_ids.push(id.clone()),
        }
    }
    info!(
        requested = verification.total_requested(),
        found = verification.found_users.len(),
        "resolved uploaded ids"
    );
    Ok(verification)
}
