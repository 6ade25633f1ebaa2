//! Turns `-T` / `-E` lists into one [`InspectionMask`].

use crate::error::ValidationError;
use crate::mask::InspectionMask;
use crate::registry::Registry;
use tracing::debug;

/// Token selecting every inspection, matched case-insensitively.
pub const ALL_TOKEN: &str = "ALL";

/// One `-T` or `-E` occurrence, holding its raw comma-separated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionRequest {
    Include(String),
    Exclude(String),
}

impl SelectionRequest {
    fn parts(&self) -> (&str, bool) {
        match self {
            SelectionRequest::Include(list) => (list, false),
            SelectionRequest::Exclude(list) => (list, true),
        }
    }
}

/// Resolves the requests of one invocation, in command-line order.
///
/// No requests selects everything. A second request fails with
/// [`ValidationError::InvalidMode`] as soon as it is seen, whatever its kind.
/// Tokens apply strictly left to right, `ALL` included.
pub fn resolve_selection(
    requests: &[SelectionRequest],
    registry: &Registry,
) -> Result<InspectionMask, ValidationError> {
    let mut mask = InspectionMask::ALL;
    let mut processed = false;

    for request in requests {
        if processed {
            return Err(ValidationError::InvalidMode);
        }
        processed = true;

        let (list, exclude) = request.parts();
        mask = if exclude {
            InspectionMask::ALL
        } else {
            InspectionMask::NONE
        };

        for token in list.split(',') {
            mask = apply_token(mask, token, exclude, registry)?;
        }
        debug!(list, exclude, mask = ?mask, "resolved inspection selection");
    }

    Ok(mask)
}

fn apply_token(
    mask: InspectionMask,
    token: &str,
    exclude: bool,
    registry: &Registry,
) -> Result<InspectionMask, ValidationError> {
    if token.eq_ignore_ascii_case(ALL_TOKEN) {
        return Ok(if exclude {
            InspectionMask::NONE
        } else {
            InspectionMask::ALL
        });
    }

    let descriptor = registry
        .lookup(token)
        .ok_or_else(|| ValidationError::UnknownInspection(token.to_string()))?;

    Ok(if exclude {
        mask.difference(descriptor.flag)
    } else {
        mask.union(descriptor.flag)
    })
}
