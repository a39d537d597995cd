//! Rebuild the requirement tree from the flat, document-ordered item list.
//!
//! Depth comes from the label pattern ([`LabelKind::level`]): main numbers
//! at 0, option headers at 1, lettered items at 2, numbered sub-items
//! at 3. A stack of open headers tracks the current path.
//!
//! - Headers pop every open header at the same or a deeper level, then
//!   become the new stack top.
//! - Leaves sit one level below the stack top and attach to it. They never
//!   pop and are never pushed, so a completable item keeps the most recent
//!   open header as its parent until another header closes it.
//!
//! The scraped `visualDepth` is not consulted.

use crate::label::classify;
use crate::model::{CanonicalRequirement, Link};

/// One processed item from the merge walk, before tree assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRequirement {
    pub scoutbook_id: String,
    pub requirement_number: String,
    pub description: String,
    pub is_header: bool,
    pub display_order: u32,
    pub links: Vec<Link>,
}

struct Slot {
    node: Option<CanonicalRequirement>,
    children: Vec<usize>,
}

/// Assemble a forest of [`CanonicalRequirement`]s. Sibling order is input order.
pub fn build(items: &[FlatRequirement]) -> Vec<CanonicalRequirement> {
    let mut slots: Vec<Slot> = Vec::with_capacity(items.len());
    let mut roots: Vec<usize> = Vec::new();
    // (slot index, level) of open headers.
    let mut stack: Vec<(usize, u8)> = Vec::new();

    for item in items {
        let below_top = stack.last().map(|&(_, level)| level + 1).unwrap_or(0);
        let level = if item.is_header {
            classify(&item.requirement_number).level().unwrap_or(below_top)
        } else {
            below_top
        };

        if item.is_header {
            while stack.last().is_some_and(|&(_, top)| top >= level) {
                stack.pop();
            }
        }

        let parent = stack.last().map(|&(idx, _)| idx);
        let parent_id = parent.and_then(|idx| {
            slots[idx]
                .node
                .as_ref()
                .map(|n| n.scoutbook_id.clone())
        });

        let idx = slots.len();
        slots.push(Slot {
            node: Some(CanonicalRequirement {
                scoutbook_id: item.scoutbook_id.clone(),
                requirement_number: item.requirement_number.clone(),
                description: item.description.clone(),
                is_header: item.is_header,
                display_order: item.display_order,
                parent_scoutbook_id: parent_id,
                links: item.links.clone(),
                children: Vec::new(),
            }),
            children: Vec::new(),
        });

        match parent {
            Some(p) => slots[p].children.push(idx),
            None => roots.push(idx),
        }

        if item.is_header {
            stack.push((idx, level));
        }
    }

    roots
        .into_iter()
        .filter_map(|idx| assemble(idx, &mut slots))
        .collect()
}

fn assemble(idx: usize, slots: &mut [Slot]) -> Option<CanonicalRequirement> {
    let mut node = slots[idx].node.take()?;
    let children = std::mem::take(&mut slots[idx].children);
    node.children = children
        .into_iter()
        .filter_map(|child| assemble(child, slots))
        .collect();
    Some(node)
}

/// A flat forest with no parent edges, one root per item.
pub fn flat(items: &[FlatRequirement]) -> Vec<CanonicalRequirement> {
    items
        .iter()
        .map(|item| CanonicalRequirement {
            scoutbook_id: item.scoutbook_id.clone(),
            requirement_number: item.requirement_number.clone(),
            description: item.description.clone(),
            is_header: item.is_header,
            display_order: item.display_order,
            parent_scoutbook_id: None,
            links: item.links.clone(),
            children: Vec::new(),
        })
        .collect()
}
