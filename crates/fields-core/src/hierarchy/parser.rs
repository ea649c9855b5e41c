//! Hierarchy parser: flat rows to forward tree plus reversed per-leaf chains.
//!
//! Nodes are built in an arena addressed by index, with one deduplication map
//! per level keyed on `(attribute, value, parent attribute:value)`. Two rows
//! sharing a prefix path converge on the same arena node; children keep
//! first-encounter order and are never sorted. The arena is then materialized
//! into a single-ownership tree, from which one reversed chain is folded per
//! zero-child node.

use std::collections::HashMap;

use crate::models::{HierarchyNode, SheetRow};

/// Output of a parse: the forward tree (roots in first-encounter order) and
/// one leaf-to-root chain per zero-child node of that tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHierarchy {
    pub forward: Vec<HierarchyNode>,
    pub reversed: Vec<HierarchyNode>,
}

struct ArenaNode {
    field_name: String,
    field_value: String,
    field_attribute: String,
    parent_field_name: Option<String>,
    parent_field_value: Option<String>,
    children: Vec<usize>,
}

/// Parse data rows into a master-list hierarchy.
///
/// `headers[j]` is the attribute key governing column `j` (`j < level_count`);
/// `attribute_labels` maps attribute keys to display labels, falling back to
/// the key itself. A row stops contributing at its first blank cell, so a row
/// shorter than `level_count` merges a partial path into the tree.
pub fn parse_hierarchy(
    headers: &[String],
    rows: &[SheetRow],
    level_count: usize,
    attribute_labels: &HashMap<String, String>,
) -> ParsedHierarchy {
    let mut arena: Vec<ArenaNode> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    let mut level_maps: Vec<HashMap<String, usize>> = vec![HashMap::new(); level_count];

    let label_for = |attribute: &str| -> String {
        attribute_labels
            .get(attribute)
            .cloned()
            .unwrap_or_else(|| attribute.to_string())
    };

    for row in rows {
        let mut parent: Option<usize> = None;
        let mut parent_attribute: Option<&str> = None;
        let mut parent_value: Option<&str> = None;

        for (j, attribute) in headers.iter().enumerate().take(level_count) {
            let Some(value) = row.cell(j) else { break };

            let key = match (parent_attribute, parent_value) {
                (Some(pa), Some(pv)) => format!("{}:{}|{}:{}", attribute, value, pa, pv),
                _ => format!("{}:{}", attribute, value),
            };

            let index = match level_maps[j].get(&key) {
                Some(&existing) => existing,
                None => {
                    let index = arena.len();
                    arena.push(ArenaNode {
                        field_name: label_for(attribute),
                        field_value: value.to_string(),
                        field_attribute: attribute.clone(),
                        // Parent pointers come from the preceding column of
                        // this row, not from the dedup map.
                        parent_field_name: parent_attribute.map(|a| label_for(a)),
                        parent_field_value: parent_value.map(str::to_string),
                        children: Vec::new(),
                    });
                    match parent {
                        Some(p) => arena[p].children.push(index),
                        None => roots.push(index),
                    }
                    level_maps[j].insert(key, index);
                    index
                }
            };

            parent = Some(index);
            parent_attribute = Some(attribute.as_str());
            parent_value = Some(value);
        }
    }

    let forward: Vec<HierarchyNode> = roots
        .iter()
        .map(|&root| materialize(&arena, root))
        .collect();

    let mut reversed = Vec::new();
    let mut path: Vec<&HierarchyNode> = Vec::new();
    for root in &forward {
        collect_reversed(root, &mut path, &mut reversed);
    }

    ParsedHierarchy { forward, reversed }
}

fn materialize(arena: &[ArenaNode], index: usize) -> HierarchyNode {
    let node = &arena[index];
    HierarchyNode {
        field_name: node.field_name.clone(),
        field_value: node.field_value.clone(),
        field_attribute: node.field_attribute.clone(),
        parent_field_name: node.parent_field_name.clone(),
        parent_field_value: node.parent_field_value.clone(),
        field_values: node
            .children
            .iter()
            .map(|&child| materialize(arena, child))
            .collect(),
    }
}

/// Depth-first walk. At each leaf, fold the root-to-leaf path into one chain:
/// the root copy carries no children and ends up innermost, each deeper node
/// wraps the accumulator, so the leaf is the outermost element pointing one
/// step up at a time.
fn collect_reversed<'a>(
    node: &'a HierarchyNode,
    path: &mut Vec<&'a HierarchyNode>,
    out: &mut Vec<HierarchyNode>,
) {
    path.push(node);

    if node.field_values.is_empty() {
        let mut chain: Option<HierarchyNode> = None;
        for step in path.iter() {
            let mut copy = step.scalar_copy();
            if let Some(inner) = chain.take() {
                copy.field_values.push(inner);
            }
            chain = Some(copy);
        }
        if let Some(chain) = chain {
            out.push(chain);
        }
    } else {
        for child in &node.field_values {
            collect_reversed(child, path, out);
        }
    }

    path.pop();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> SheetRow {
        SheetRow::new(cells.iter().map(|c| Some(c.to_string())).collect())
    }

    fn headers(attrs: &[&str]) -> Vec<String> {
        attrs.iter().map(|a| a.to_string()).collect()
    }

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(a, l)| (a.to_string(), l.to_string()))
            .collect()
    }

    fn total_nodes(forest: &[HierarchyNode]) -> usize {
        forest.iter().map(HierarchyNode::node_count).sum()
    }

    fn total_leaves(forest: &[HierarchyNode]) -> usize {
        forest.iter().map(HierarchyNode::leaf_count).sum()
    }

    #[test]
    fn test_shared_prefix_rows_merge_into_one_node() {
        let parsed = parse_hierarchy(
            &headers(&["country", "state"]),
            &[row(&["India", "Karnataka"]), row(&["India", "Kerala"])],
            2,
            &labels(&[("country", "Country"), ("state", "State")]),
        );

        assert_eq!(parsed.forward.len(), 1);
        let india = &parsed.forward[0];
        assert_eq!(india.field_name, "Country");
        assert_eq!(india.field_value, "India");
        assert_eq!(india.field_attribute, "country");
        assert_eq!(india.field_values.len(), 2);
        assert_eq!(india.field_values[0].field_value, "Karnataka");
        assert_eq!(india.field_values[1].field_value, "Kerala");
        assert_eq!(
            india.field_values[0].parent_field_name.as_deref(),
            Some("Country")
        );
        assert_eq!(
            india.field_values[0].parent_field_value.as_deref(),
            Some("India")
        );

        // 3 distinct paths across 2 rows: India, India/Karnataka, India/Kerala.
        assert_eq!(total_nodes(&parsed.forward), 3);
    }

    #[test]
    fn test_reversed_chain_count_equals_leaf_count() {
        let parsed = parse_hierarchy(
            &headers(&["country", "state", "city"]),
            &[
                row(&["India", "Karnataka", "Bengaluru"]),
                row(&["India", "Karnataka", "Mysuru"]),
                row(&["India", "Kerala", "Kochi"]),
                row(&["Japan", "Kanto", "Tokyo"]),
            ],
            3,
            &HashMap::new(),
        );

        assert_eq!(total_leaves(&parsed.forward), 4);
        assert_eq!(parsed.reversed.len(), 4);
    }

    #[test]
    fn test_single_path_reversed_chain_orders_leaf_outermost() {
        let parsed = parse_hierarchy(
            &headers(&["a", "b", "c"]),
            &[row(&["A", "B", "C"])],
            3,
            &HashMap::new(),
        );

        // Forward: single chain A -> B -> C.
        let a = &parsed.forward[0];
        assert_eq!(a.field_value, "A");
        assert_eq!(a.field_values[0].field_value, "B");
        assert_eq!(a.field_values[0].field_values[0].field_value, "C");

        // Reversed: leaf C outermost, each fieldValues pointing one node up,
        // root A innermost with no children. Reversing it again reproduces
        // the original parent/child order.
        assert_eq!(parsed.reversed.len(), 1);
        let c = &parsed.reversed[0];
        assert_eq!(c.field_value, "C");
        let b = &c.field_values[0];
        assert_eq!(b.field_value, "B");
        let a = &b.field_values[0];
        assert_eq!(a.field_value, "A");
        assert!(a.field_values.is_empty());
    }

    #[test]
    fn test_country_state_scenario() {
        let parsed = parse_hierarchy(
            &headers(&["country", "state"]),
            &[row(&["India", "Karnataka"]), row(&["India", "Kerala"])],
            2,
            &labels(&[("country", "Country"), ("state", "State")]),
        );

        assert_eq!(parsed.reversed.len(), 2);
        for chain in &parsed.reversed {
            assert_eq!(chain.field_attribute, "state");
            assert_eq!(chain.field_values.len(), 1);
            assert_eq!(chain.field_values[0].field_value, "India");
            assert!(chain.field_values[0].field_values.is_empty());
        }
    }

    #[test]
    fn test_blank_row_contributes_nothing() {
        let parsed = parse_hierarchy(
            &headers(&["country", "state"]),
            &[
                row(&["India", "Karnataka"]),
                SheetRow::new(vec![None, Some("Orphan".to_string())]),
            ],
            2,
            &HashMap::new(),
        );

        // The second row stops at its blank first cell; "Orphan" never lands.
        assert_eq!(total_nodes(&parsed.forward), 2);
    }

    #[test]
    fn test_partial_row_merges_and_counts_as_leaf() {
        let parsed = parse_hierarchy(
            &headers(&["country", "state", "city"]),
            &[
                row(&["India", "Karnataka", "Bengaluru"]),
                SheetRow::new(vec![Some("India".to_string()), Some("Kerala".to_string()), None]),
            ],
            3,
            &HashMap::new(),
        );

        // India, Karnataka, Bengaluru, Kerala.
        assert_eq!(total_nodes(&parsed.forward), 4);
        // Kerala has no children, so it yields a chain of its own even though
        // the business domain would call it an interior level.
        assert_eq!(parsed.reversed.len(), 2);
        let kerala_chain = parsed
            .reversed
            .iter()
            .find(|c| c.field_value == "Kerala")
            .expect("Kerala chain");
        assert_eq!(kerala_chain.field_values[0].field_value, "India");
    }

    #[test]
    fn test_same_value_under_different_parents_stays_distinct() {
        let parsed = parse_hierarchy(
            &headers(&["country", "state"]),
            &[
                row(&["India", "Springfield"]),
                row(&["USA", "Springfield"]),
            ],
            2,
            &HashMap::new(),
        );

        // Same (attribute, value) but different parent paths: two nodes.
        assert_eq!(total_nodes(&parsed.forward), 4);
        assert_eq!(parsed.reversed.len(), 2);
    }

    #[test]
    fn test_duplicate_rows_share_one_leaf_and_one_chain() {
        let parsed = parse_hierarchy(
            &headers(&["country", "state"]),
            &[
                row(&["India", "Karnataka"]),
                row(&["India", "Karnataka"]),
                row(&["India", "Karnataka"]),
            ],
            2,
            &HashMap::new(),
        );

        assert_eq!(total_nodes(&parsed.forward), 2);
        assert_eq!(parsed.reversed.len(), 1);
    }

    #[test]
    fn test_first_encounter_order_is_preserved() {
        let parsed = parse_hierarchy(
            &headers(&["country"]),
            &[row(&["Zambia"]), row(&["Austria"]), row(&["Zambia"])],
            1,
            &HashMap::new(),
        );

        let order: Vec<&str> = parsed
            .forward
            .iter()
            .map(|n| n.field_value.as_str())
            .collect();
        assert_eq!(order, vec!["Zambia", "Austria"]);
    }

    #[test]
    fn test_label_falls_back_to_attribute_key() {
        let parsed = parse_hierarchy(
            &headers(&["country"]),
            &[row(&["India"])],
            1,
            &HashMap::new(),
        );
        assert_eq!(parsed.forward[0].field_name, "country");
    }

    #[test]
    fn test_empty_rows_produce_empty_hierarchy() {
        let parsed = parse_hierarchy(&headers(&["country"]), &[], 1, &HashMap::new());
        assert!(parsed.forward.is_empty());
        assert!(parsed.reversed.is_empty());
    }
}
