//! Resolve a user-typed reference to a record id.
//!
//! A reference may be a full id, an exact name, or a unique id prefix
//! (useful for the long `sched-...` session ids). Matching is tried in
//! that order and the first unambiguous hit wins.

use anyhow::{Result, bail};

use roster_core::EntityKind;
use roster_store::{Mentor, Module, ScheduleItem, Starter};

/// Something addressable by id and, optionally, by name.
pub trait Addressable {
    fn id(&self) -> &str;
    fn name(&self) -> Option<&str>;
}

impl Addressable for Starter {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl Addressable for Mentor {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl Addressable for Module {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Sessions have no unique name; only ids and id prefixes resolve.
impl Addressable for ScheduleItem {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> Option<&str> {
        None
    }
}

/// Return the item that `input` refers to.
pub fn resolve<'a, T: Addressable>(items: &'a [T], input: &str, kind: EntityKind) -> Result<&'a T> {
    let input = input.trim();
    if input.is_empty() {
        bail!("empty {kind} reference");
    }

    if let Some(item) = items.iter().find(|i| i.id() == input) {
        return Ok(item);
    }

    let by_name: Vec<&T> = items.iter().filter(|i| i.name() == Some(input)).collect();
    match by_name.as_slice() {
        [one] => return Ok(one),
        [] => {}
        many => bail!(
            "{kind} name {input:?} is ambiguous ({} matches); use the id instead",
            many.len()
        ),
    }

    let by_prefix: Vec<&T> = items.iter().filter(|i| i.id().starts_with(input)).collect();
    match by_prefix.as_slice() {
        [one] => Ok(one),
        [] => bail!("{kind} {input:?} not found"),
        many => bail!(
            "{kind} id prefix {input:?} is ambiguous ({} matches)",
            many.len()
        ),
    }
}
