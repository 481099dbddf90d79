//! Deterministic entity resolution.
//!
//! Maps a [`ResolutionQuery`] to concrete targets against a
//! [`RegistrySnapshot`]. All matching is case-insensitive; the four filters
//! (name, area, floor, domain) combine by intersection. Exact name/alias
//! matches win outright over partial matches, and anything still ambiguous
//! after narrowing is reported as ambiguous — the resolver never guesses.

use super::query::{ResolutionQuery, ResolvedTarget};
use super::records::{EntityRecord, RegistrySnapshot};
use crate::util::normalize;
use std::collections::HashSet;
use thiserror::Error;

/// Resolution failures. `NoMatch` and `Ambiguous` are recoverable — the
/// dispatcher turns them into results the model can react to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no entity matches the query")]
    NoMatch,

    #[error("ambiguous target, candidates: {}", .0.join(", "))]
    Ambiguous(Vec<String>),

    #[error("resolution query has no filters")]
    EmptyQuery,
}

/// How well an entity matched the name fragment. Order matters: a match on
/// the display name outranks a match on an alias of the same exactness, so
/// an entity whose name and alias both match counts at its name rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NameRank {
    ExactName,
    ExactAlias,
    PartialName,
    PartialAlias,
}

impl NameRank {
    fn is_exact(self) -> bool {
        matches!(self, NameRank::ExactName | NameRank::ExactAlias)
    }
}

fn name_rank(snapshot: &RegistrySnapshot, entity: &EntityRecord, fragment: &str) -> Option<NameRank> {
    let display = normalize(&entity.name);
    if display == fragment {
        return Some(NameRank::ExactName);
    }

    let aliases: Vec<String> = snapshot
        .aliases_of(&entity.entity_id)
        .iter()
        .map(|a| normalize(a))
        .collect();
    if aliases.iter().any(|a| a == fragment) {
        return Some(NameRank::ExactAlias);
    }

    if display.contains(fragment) {
        return Some(NameRank::PartialName);
    }
    if aliases.iter().any(|a| a.contains(fragment)) {
        return Some(NameRank::PartialAlias);
    }

    None
}

/// Group ids (area ids or floor ids) whose name matches the fragment,
/// exactly or by substring.
fn matching_group_ids<'a>(
    groups: impl Iterator<Item = (&'a str, &'a str)>,
    fragment: &str,
) -> HashSet<String> {
    groups
        .filter(|(_, name)| {
            let name = normalize(name);
            name == fragment || name.contains(fragment)
        })
        .map(|(id, _)| id.to_string())
        .collect()
}

/// Resolve a query into concrete targets, in stable registry order.
///
/// With a name fragment, the result is always a single entity: exact
/// matches discard partial ones, and any remaining tie (including an exact
/// display name against another entity's identical alias) is
/// [`ResolveError::Ambiguous`]. Without a name fragment, every entity
/// passing the area/floor/domain intersection is returned and the caller
/// decides whether a multi-entity set is acceptable.
pub fn resolve(
    snapshot: &RegistrySnapshot,
    query: &ResolutionQuery,
) -> Result<Vec<ResolvedTarget>, ResolveError> {
    if query.is_empty() {
        return Err(ResolveError::EmptyQuery);
    }

    let name_fragment = query.name.as_deref().map(normalize).filter(|s| !s.is_empty());
    let area_fragment = query.area.as_deref().map(normalize).filter(|s| !s.is_empty());
    let floor_fragment = query.floor.as_deref().map(normalize).filter(|s| !s.is_empty());

    let area_ids = area_fragment.as_deref().map(|frag| {
        matching_group_ids(
            snapshot
                .areas
                .iter()
                .map(|a| (a.area_id.as_str(), a.name.as_str())),
            frag,
        )
    });
    let floor_ids = floor_fragment.as_deref().map(|frag| {
        matching_group_ids(
            snapshot
                .floors
                .iter()
                .map(|f| (f.floor_id.as_str(), f.name.as_str())),
            frag,
        )
    });

    let mut candidates: Vec<(&EntityRecord, Option<NameRank>)> = Vec::new();
    for entity in &snapshot.entities {
        let rank = match name_fragment.as_deref() {
            Some(frag) => match name_rank(snapshot, entity, frag) {
                Some(rank) => Some(rank),
                None => continue,
            },
            None => None,
        };

        if let Some(area_ids) = &area_ids {
            match entity.area_id.as_deref() {
                Some(area_id) if area_ids.contains(area_id) => {}
                _ => continue,
            }
        }

        if let Some(floor_ids) = &floor_ids {
            match snapshot.floor_of(entity) {
                Some(floor_id) if floor_ids.contains(floor_id) => {}
                _ => continue,
            }
        }

        if let Some(domains) = &query.domains
            && !domains.is_empty()
            && !domains.contains(&entity.domain)
        {
            continue;
        }

        candidates.push((entity, rank));
    }

    // Exact name/alias matches win outright over partial matches.
    if candidates.iter().any(|(_, r)| r.is_some_and(NameRank::is_exact)) {
        candidates.retain(|(_, r)| r.is_some_and(NameRank::is_exact));
    }

    if candidates.is_empty() {
        return Err(ResolveError::NoMatch);
    }

    // A name refers to one device: any surviving tie is ambiguous.
    if name_fragment.is_some() && candidates.len() > 1 {
        let mut names: Vec<String> = candidates.iter().map(|(e, _)| e.name.clone()).collect();
        names.sort();
        return Err(ResolveError::Ambiguous(names));
    }

    Ok(candidates
        .into_iter()
        .map(|(entity, _)| ResolvedTarget {
            entity_id: entity.entity_id.clone(),
            domain: entity.domain.clone(),
            area_id: entity.area_id.clone(),
            floor_id: snapshot.floor_of(entity).map(String::from),
        })
        .collect())
}
