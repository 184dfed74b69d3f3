use serde::Deserialize;

use crate::common::{Error, Result};

const MAX_REGION_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegionInput {
    pub region_name: String,
}

pub fn validate_region_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("regionName is required"));
    }
    if name.chars().count() > MAX_REGION_NAME_LEN {
        return Err(Error::validation(format!(
            "regionName must be at most {} characters",
            MAX_REGION_NAME_LEN
        )));
    }
    Ok(name.to_string())
}
