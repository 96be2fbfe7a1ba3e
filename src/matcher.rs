//! Bidirectional request matching.
//!
//! Two postings match when each one's entire wanted list is covered by the
//! other's held sections. Matching is boolean and all-or-nothing; there is no
//! partial credit or ranking. The functions here are pure: they read the
//! snapshot the caller fetched and allocate their own output, so concurrent
//! invocations are safe by construction.

use std::collections::HashMap;

use crate::models::{HeldItem, Posting, WantedItem};

/// For each of the subject's OPEN postings, the other OPEN postings that
/// mutually satisfy it, keyed by posting id.
///
/// Postings with no matches are omitted from the map entirely. Match lists
/// preserve the relative order of the input snapshot. Callers are expected to
/// pass only OPEN postings; anything CLOSED that slips through is skipped.
pub fn find_matches<'a>(
    all_open: &'a [Posting],
    subject_user_id: &str,
) -> HashMap<String, Vec<&'a Posting>> {
    let (mine, others): (Vec<&Posting>, Vec<&Posting>) = all_open
        .iter()
        .filter(|p| p.is_open())
        .partition(|p| p.owner_id == subject_user_id);

    let mut matches = HashMap::new();
    for m in mine {
        let matched: Vec<&Posting> = others
            .iter()
            .copied()
            .filter(|o| mutually_satisfies(m, o))
            .collect();
        if !matched.is_empty() {
            matches.insert(m.id.clone(), matched);
        }
    }
    matches
}

/// Whether every wanted course of `a` is covered by `b`'s held sections and
/// vice versa. Symmetric in its arguments.
pub fn mutually_satisfies(a: &Posting, b: &Posting) -> bool {
    covers(&b.held, &a.wanted) && covers(&a.held, &b.wanted)
}

/// All-or-nothing coverage of a wanted list by a held list. A posting with an
/// empty held or wanted collection is malformed and simply covers nothing,
/// rather than matching vacuously.
fn covers(held: &[HeldItem], wanted: &[WantedItem]) -> bool {
    !wanted.is_empty() && wanted.iter().all(|w| satisfies(w, held))
}

/// Whether some held section fulfils one wanted course. Course codes compare
/// case-insensitively; section labels compare exactly on the canonicalized
/// (uppercase) form, unless the filter is the wildcard.
fn satisfies(wanted: &WantedItem, held: &[HeldItem]) -> bool {
    held.iter().any(|h| {
        h.course.code.eq_ignore_ascii_case(&wanted.course) && wanted.sections.accepts(&h.course.section)
    })
}
