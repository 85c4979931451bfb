use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::db::models::{Group, Site};

/// One group with its sites and child groups attached, fully ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    #[serde(flatten)]
    pub group: Group,
    pub sites: Vec<Site>,
    pub children: Vec<GroupNode>,
}

/// Assemble flat rows into an ordered forest.
///
/// - a site whose `group_id` matches no loaded group is dropped
/// - a group whose parent is missing from the batch (or is itself) is
///   promoted to a root
/// - every sibling list is sorted by `(order_num, id)`, so equal
///   `order_num` values still produce one deterministic order
///
/// Cycle-freedom is a write-side guarantee, not re-checked here; each
/// group is consumed at most once, so even corrupt data cannot recurse
/// forever (it would merely be unreachable from the roots).
pub fn assemble(groups: Vec<Group>, sites: Vec<Site>) -> Vec<GroupNode> {
    let present: HashSet<i64> = groups.iter().map(|g| g.id).collect();

    let mut sites_by_group: HashMap<i64, Vec<Site>> = HashMap::new();
    for site in sites {
        if present.contains(&site.group_id) {
            sites_by_group.entry(site.group_id).or_default().push(site);
        } else {
            debug!(
                site_id = site.id,
                group_id = site.group_id,
                "dropping site without a visible group"
            );
        }
    }

    let mut roots: Vec<Group> = Vec::new();
    let mut children_by_parent: HashMap<i64, Vec<Group>> = HashMap::new();
    for group in groups {
        match group.parent_id {
            Some(parent_id) if parent_id != group.id && present.contains(&parent_id) => {
                children_by_parent.entry(parent_id).or_default().push(group);
            }
            _ => roots.push(group),
        }
    }

    let mut forest: Vec<GroupNode> = roots
        .into_iter()
        .map(|group| build_node(group, &mut children_by_parent, &mut sites_by_group))
        .collect();
    forest.sort_by_key(|node| (node.group.order_num, node.group.id));
    forest
}

fn build_node(
    group: Group,
    children_by_parent: &mut HashMap<i64, Vec<Group>>,
    sites_by_group: &mut HashMap<i64, Vec<Site>>,
) -> GroupNode {
    let mut children: Vec<GroupNode> = children_by_parent
        .remove(&group.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| build_node(child, children_by_parent, sites_by_group))
        .collect();
    children.sort_by_key(|node| (node.group.order_num, node.group.id));

    let mut sites = sites_by_group.remove(&group.id).unwrap_or_default();
    sites.sort_by_key(|site| (site.order_num, site.id));

    GroupNode {
        group,
        sites,
        children,
    }
}
