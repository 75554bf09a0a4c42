//! Derivation of removable "active filter" chips from the filter state,
//! and the inverse operation that clears the facet(s) behind a chip.
//!
//! Derivation is a pure, table-driven function over the schema tables;
//! it is re-evaluated whenever the state or the person directory
//! changes. Emission order follows the declaration tables and is part
//! of the presentation contract.

use tracing::{debug, warn};

use super::schema::{Facet, FacetKind, RANGE_PAIRS, SCALAR_CHIP_FACETS, TOGGLE_CHIP_FACETS};
use super::state::{FilterState, FilterStore};
use crate::people::{PersonDirectory, TypeLabels};

/// What clearing a chip writes back through the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearKey {
    /// Reset one facet to its inactive value.
    Facet(Facet),
    /// Reset both sides of a range pair atomically.
    Range(Facet, Facet),
    /// Remove one id from the person list, keeping the rest in order.
    Person(i64),
}

/// One removable chip shown for a currently active facet.
#[derive(Debug, Clone, PartialEq)]
pub struct Chip {
    pub id: String,
    pub label_key: &'static str,
    pub value: String,
    pub clear: ClearKey,
}

/// Derive the ordered chip list for a state snapshot.
///
/// Scalar chips come first, then one chip per person id, then the
/// toggle chips, then one chip per active range pair.
pub fn derive_chips(
    state: &FilterState,
    people: &PersonDirectory,
    types: &TypeLabels,
) -> Vec<Chip> {
    let mut chips = Vec::new();

    for &(facet, label_key) in SCALAR_CHIP_FACETS {
        let raw = state.text(facet);
        if raw.is_empty() {
            continue;
        }
        let value = if facet == Facet::Type {
            types.label(raw)
        } else {
            raw.to_string()
        };
        chips.push(Chip {
            id: facet.name().to_string(),
            label_key,
            value,
            clear: ClearKey::Facet(facet),
        });
    }

    for token in state.person_id.split(',') {
        if token.is_empty() {
            continue;
        }
        let Ok(id) = token.parse::<i64>() else {
            debug!(token, "skipping non-numeric person id token");
            continue;
        };
        chips.push(Chip {
            id: format!("person_{id}"),
            label_key: "filter.person",
            value: people.display_name(id),
            clear: ClearKey::Person(id),
        });
    }

    for &(facet, label_key) in TOGGLE_CHIP_FACETS {
        if !state.flag(facet) {
            continue;
        }
        chips.push(Chip {
            id: facet.name().to_string(),
            label_key,
            value: String::new(),
            clear: ClearKey::Facet(facet),
        });
    }

    for pair in RANGE_PAIRS {
        let min = state.text(pair.min);
        let max = state.text(pair.max);
        let value = match (min.is_empty(), max.is_empty()) {
            (true, true) => continue,
            (false, false) => format!("{min}\u{2013}{max}"),
            (false, true) => format!("\u{2265}{min}"),
            (true, false) => format!("\u{2264}{max}"),
        };
        chips.push(Chip {
            id: pair.min.name().to_string(),
            label_key: pair.label_key,
            value,
            clear: ClearKey::Range(pair.min, pair.max),
        });
    }

    chips
}

/// Reset the facet(s) behind a chip to their inactive values.
///
/// Range pairs go through one `set_many` so no observer sees a state
/// with only one side cleared. Clearing never fails: a key that does
/// not map to a clearable facet is logged and ignored.
pub fn clear_chip(store: &mut FilterStore, key: &ClearKey) {
    match *key {
        ClearKey::Facet(facet) => match facet.kind() {
            FacetKind::Text => store.set_one(facet, "".into()),
            FacetKind::Toggle => store.set_one(facet, false.into()),
        },
        ClearKey::Range(min, max) => {
            if min.kind() != FacetKind::Text || max.kind() != FacetKind::Text {
                warn!(%min, %max, "range clear key does not name text facets, ignored");
                return;
            }
            store.set_many(&[(min, "".into()), (max, "".into())]);
        }
        ClearKey::Person(id) => {
            let wanted = id.to_string();
            let remaining = store
                .get()
                .person_id
                .split(',')
                .filter(|token| !token.is_empty() && *token != wanted)
                .collect::<Vec<_>>()
                .join(",");
            // An empty result is written as "", not left out.
            store.set_one(Facet::PersonId, remaining.into());
        }
    }
}
