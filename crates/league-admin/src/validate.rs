//! Form field validation.
//!
//! Each helper turns one raw form value into the stored type or an
//! [`AdminError::InvalidInput`] naming the field.

use league_types::{KnockoutStage, TeamId};

use crate::error::AdminError;

/// Trim a required name. Blank is rejected.
pub fn required_name(field: &str, raw: &str) -> Result<String, AdminError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AdminError::InvalidInput(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional URL. Blank means none.
pub fn optional_url(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
}

/// A non-negative counter that fits the stored type.
pub fn counter(field: &str, raw: i64) -> Result<u32, AdminError> {
    u32::try_from(raw).map_err(|_err| {
        AdminError::InvalidInput(format!("{field} must be between 0 and {}, got {raw}", u32::MAX))
    })
}

/// Two team references that must not be the same team.
pub fn distinct(home: TeamId, away: TeamId) -> Result<(), AdminError> {
    if home == away {
        return Err(AdminError::InvalidInput(
            "a team cannot play against itself".to_owned(),
        ));
    }
    Ok(())
}

/// Optional knockout slots: distinct when both are set.
pub fn distinct_slots(team1: Option<TeamId>, team2: Option<TeamId>) -> Result<(), AdminError> {
    match (team1, team2) {
        (Some(a), Some(b)) => distinct(a, b),
        _ => Ok(()),
    }
}

/// The stored match number for a knockout fixture. The final is always 1.
pub fn match_number(stage: KnockoutStage, raw: i64) -> Result<u8, AdminError> {
    if stage == KnockoutStage::Final {
        return Ok(1);
    }
    let max = stage.max_match_number();
    u8::try_from(raw)
        .ok()
        .filter(|n| (1..=max).contains(n))
        .ok_or_else(|| {
            AdminError::InvalidInput(format!(
                "{stage} match number must be between 1 and {max}, got {raw}"
            ))
        })
}
