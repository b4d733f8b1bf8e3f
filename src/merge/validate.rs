//! Request checks that run before any store access.

use crate::storage::value::{PropValueOwned, PropertyMap, ValueError};

use super::errors::{MergeError, Result};
use super::types::{MergeRequest, Shape};

/// Checks the identity of a merge.
///
/// Node merges need at least one identifying property. Relationship merges accept a
/// missing or empty identity, which then matches every relationship of the type between
/// the endpoints.
pub fn validate_identity(shape: &Shape, identity: Option<&PropertyMap>) -> Result<()> {
    match shape {
        Shape::Node { .. } if identity.map_or(true, PropertyMap::is_empty) => {
            Err(MergeError::EmptyIdentity)
        }
        _ => Ok(()),
    }
}

/// Checks a whole request: names, identity and every property value it carries.
pub fn validate(request: &MergeRequest) -> Result<()> {
    validate_shape(&request.shape)?;
    validate_identity(&request.shape, request.identity.as_ref())?;
    if let Some(identity) = &request.identity {
        validate_props(identity)?;
        reject_nan(identity)?;
    }
    validate_props(request.policy.on_create())?;
    if let Some(on_match) = request.policy.on_match() {
        validate_props(on_match)?;
    }
    Ok(())
}

fn validate_shape(shape: &Shape) -> Result<()> {
    match shape {
        Shape::Node { labels } if labels.iter().any(String::is_empty) => {
            Err(MergeError::EmptyName { what: "label" })
        }
        Shape::Relationship { ty, .. } if ty.is_empty() => Err(MergeError::EmptyName {
            what: "relationship type",
        }),
        _ => Ok(()),
    }
}

fn validate_props(props: &PropertyMap) -> Result<()> {
    for (key, value) in props {
        value.check_shape().map_err(|reason| ValueError {
            key: key.clone(),
            reason,
        })?;
    }
    Ok(())
}

/// NaN never equals itself, so an identity holding one could never match what it creates.
fn reject_nan(identity: &PropertyMap) -> Result<()> {
    fn is_nan(value: &PropValueOwned) -> bool {
        match value {
            PropValueOwned::Float(f) => f.is_nan(),
            PropValueOwned::List(items) => items.iter().any(is_nan),
            _ => false,
        }
    }
    match identity.iter().find(|(_, value)| is_nan(value)) {
        Some((key, _)) => Err(ValueError {
            key: key.clone(),
            reason: "NaN cannot identify an entity",
        }
        .into()),
        None => Ok(()),
    }
}
