use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::common::{Error, RegionId, Result, UserId};
use crate::domains::artefacts::machines::LifecycleEvent;
use crate::domains::artefacts::models::{Artefact, ArtefactStatus, Classification, Version};

const MAX_TITLE_LEN: usize = 200;
const MAX_TAG_LEN: usize = 64;

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtefactInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub classification: String,
    /// Blob handle for an initial version 1
    #[serde(default)]
    pub content_ref: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtefactInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub classification: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVersionInput {
    pub content_ref: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionInput {
    #[serde(default)]
    pub comment: Option<String>,
}

/// Raw `GET /artefacts` query parameters. Empty strings mean "not set".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtefactListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub classification: Option<String>,
    pub owner_id: Option<String>,
    pub region_id: Option<String>,
}

// ============================================================================
// Filters
// ============================================================================

/// Store-level artefact predicate. Policy is applied on top of this, never
/// instead of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtefactQuery {
    pub search: Option<String>,
    pub status: Option<ArtefactStatus>,
    pub classification: Option<Classification>,
    pub owner_id: Option<UserId>,
    pub region_id: Option<RegionId>,
    /// Restrict to one region plus anything the given user owns elsewhere
    pub scope: Option<RegionScope>,
}

/// `region_id = scope.region_id OR owner_id = scope.owner_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionScope {
    pub region_id: RegionId,
    pub owner_id: UserId,
}

impl RegionScope {
    pub fn contains(&self, artefact: &Artefact) -> bool {
        artefact.region_id == self.region_id || artefact.owner_id == self.owner_id
    }
}

impl ArtefactQuery {
    pub fn from_params(params: ArtefactListParams) -> Result<Self> {
        Ok(Self {
            search: non_empty(params.search),
            status: non_empty(params.status)
                .map(|s| s.parse())
                .transpose()?,
            classification: non_empty(params.classification)
                .map(|s| s.parse())
                .transpose()?,
            owner_id: non_empty(params.owner_id)
                .map(|s| UserId::parse(&s).map_err(|_| Error::validation("Invalid ownerId")))
                .transpose()?,
            region_id: non_empty(params.region_id)
                .map(|s| RegionId::parse(&s).map_err(|_| Error::validation("Invalid regionId")))
                .transpose()?,
            scope: None,
        })
    }

    pub fn matches(&self, artefact: &Artefact) -> bool {
        self.status.map_or(true, |s| artefact.status == s)
            && self
                .classification
                .map_or(true, |c| artefact.classification == c)
            && self.owner_id.map_or(true, |o| artefact.owner_id == o)
            && self.region_id.map_or(true, |r| artefact.region_id == r)
            && self.scope.map_or(true, |scope| scope.contains(artefact))
            && self
                .search
                .as_deref()
                .map_or(true, |term| artefact.matches_search(term))
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// Single-artefact view with its version history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtefactDetail {
    #[serde(flatten)]
    pub artefact: Artefact,
    pub versions: Vec<Version>,
    pub available_events: Vec<LifecycleEvent>,
}

// ============================================================================
// Validation
// ============================================================================

pub fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title.to_string())
}

/// Trim, lower-case and de-duplicate tags; blank tags are dropped.
pub fn normalize_tags(tags: Vec<String>) -> Result<BTreeSet<String>> {
    let mut out = BTreeSet::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(Error::validation(format!(
                "Tags must be at most {} characters",
                MAX_TAG_LEN
            )));
        }
        out.insert(tag);
    }
    Ok(out)
}

pub fn validate_content_ref(content_ref: &str) -> Result<String> {
    let content_ref = content_ref.trim();
    if content_ref.is_empty() {
        return Err(Error::validation("contentRef is required"));
    }
    Ok(content_ref.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_mean_no_filter() {
        let query = ArtefactQuery::from_params(ArtefactListParams {
            search: Some("  ".to_string()),
            status: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(query, ArtefactQuery::default());
    }

    #[test]
    fn bad_values_are_validation_errors() {
        let bad_status = ArtefactListParams {
            status: Some("published".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ArtefactQuery::from_params(bad_status),
            Err(Error::Validation(_))
        ));

        let bad_region = ArtefactListParams {
            region_id: Some("R2".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ArtefactQuery::from_params(bad_region),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn tags_are_normalized() {
        let tags = normalize_tags(vec![
            " Finance ".to_string(),
            "finance".to_string(),
            "".to_string(),
            "Risk".to_string(),
        ])
        .unwrap();
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["finance".to_string(), "risk".to_string()]
        );
    }

    #[test]
    fn title_is_required() {
        assert!(validate_title("   ").is_err());
        assert_eq!(validate_title("  Playbook ").unwrap(), "Playbook");
        assert!(validate_title(&"x".repeat(201)).is_err());
    }

    #[test]
    fn region_scope_admits_home_region_or_own_work() {
        let owner = UserId::new();
        let home = RegionId::new();
        let scope = RegionScope {
            region_id: home,
            owner_id: owner,
        };
        let artefact = |region_id, owner_id| Artefact {
            id: crate::common::ArtefactId::new(),
            title: "Playbook".to_string(),
            description: String::new(),
            tags: BTreeSet::new(),
            classification: Classification::Internal,
            status: ArtefactStatus::Draft,
            owner_id,
            region_id,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        assert!(scope.contains(&artefact(home, UserId::new())));
        assert!(scope.contains(&artefact(RegionId::new(), owner)));
        assert!(!scope.contains(&artefact(RegionId::new(), UserId::new())));
    }
}
