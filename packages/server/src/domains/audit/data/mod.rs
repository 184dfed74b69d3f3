use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::common::{Error, Result, UserId};
use crate::domains::audit::models::{AuditAction, AuditLogEntry, TargetType};

/// Raw `GET /audit` query parameters. Empty strings mean "not set".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditListParams {
    pub action: Option<String>,
    pub target_type: Option<String>,
    pub actor_id: Option<String>,
    pub target_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Store-level audit predicate. `from` is inclusive, `to` is exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditQuery {
    pub action: Option<AuditAction>,
    pub target_type: Option<TargetType>,
    pub actor_id: Option<UserId>,
    pub target_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AuditQuery {
    pub fn from_params(params: AuditListParams) -> Result<Self> {
        let query = Self {
            action: non_empty(params.action).map(|s| s.parse()).transpose()?,
            target_type: non_empty(params.target_type)
                .map(|s| s.parse())
                .transpose()?,
            actor_id: non_empty(params.actor_id)
                .map(|s| UserId::parse(&s).map_err(|_| Error::validation("Invalid actorId")))
                .transpose()?,
            target_id: non_empty(params.target_id)
                .map(|s| Uuid::parse_str(&s).map_err(|_| Error::validation("Invalid targetId")))
                .transpose()?,
            from: non_empty(params.from)
                .map(|s| parse_bound(&s, Bound::Start))
                .transpose()?,
            to: non_empty(params.to)
                .map(|s| parse_bound(&s, Bound::End))
                .transpose()?,
        };

        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(Error::validation("`from` must not be after `to`"));
            }
        }
        Ok(query)
    }

    pub fn for_target(target_id: impl Into<Uuid>) -> Self {
        Self {
            target_id: Some(target_id.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.action.map_or(true, |a| entry.action == a)
            && self.target_type.map_or(true, |t| entry.target_type == t)
            && self.actor_id.map_or(true, |a| entry.actor_id == a)
            && self.target_id.map_or(true, |t| entry.target_id == t)
            && self.from.map_or(true, |from| entry.created_at >= from)
            && self.to.map_or(true, |to| entry.created_at < to)
    }
}

enum Bound {
    Start,
    End,
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates. A plain date used
/// as the upper bound covers that whole day.
fn parse_bound(raw: &str, bound: Bound) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        let ts = ts.with_timezone(&Utc);
        return Ok(match bound {
            Bound::Start => ts,
            Bound::End => ts + chrono::Duration::microseconds(1),
        });
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("Invalid date: {}", raw)))?;
    let date = match bound {
        Bound::Start => date,
        Bound::End => date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::validation(format!("Invalid date: {}", raw)))?,
    };
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
