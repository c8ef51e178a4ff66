//! `verify`: match a store CSV against the user directory.

use std::path::Path;

use crate::{storage::Storage, upload, users};

use super::{format::format_verification, read_file, with_api};

pub(super) fn cmd_verify(storage: &Storage, stores: &Path) -> Result<(), String> {
    let ids = upload::parse_id_list(&read_file(stores)?);
    if ids.is_empty() {
        return Err(format!("{} contains no store ids", stores.display()));
    }

    let verification = with_api(storage, |config, api| {
        users::verify(api, &config.hidden_attribute_key, config.page_size, &ids)
            .map_err(|e| format!("failed to look up users: {e}"))
    })?;

    println!("{}", format_verification(&verification));
    Ok(())
}
