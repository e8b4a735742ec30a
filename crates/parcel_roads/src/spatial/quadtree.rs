use std::collections::HashMap;
use std::hash::Hash;

use bevy::prelude::*;

use super::{SpatialIndexReader, SpatialVisitor};
use crate::config::{SEARCH_TREE_HALF_EXTENT, SEARCH_TREE_MAX_DEPTH, SEARCH_TREE_SPLIT_THRESHOLD};

#[derive(Debug, Clone)]
struct Node<T> {
    bounds: Rect,
    depth: u8,
    items: Vec<(Rect, T)>,
    children: Option<[usize; 4]>,
}

impl<T> Node<T> {
    fn new(bounds: Rect, depth: u8) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }
}

/// Quadtree over X-Z rectangles.
///
/// Items live in the deepest node whose square fully contains them, so an
/// item straddling a child boundary stays at the parent. Items that do not
/// fit the root at all are kept at the root. Nodes split once they hold more
/// than `split_threshold` items, up to `max_depth`.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    nodes: Vec<Node<T>>,
    /// Node index holding each item.
    slots: HashMap<T, usize>,
    split_threshold: usize,
    max_depth: u8,
}

impl<T: Copy + Eq + Hash> Default for QuadTree<T> {
    fn default() -> Self {
        Self::new(
            Rect::from_center_half_size(Vec2::ZERO, Vec2::splat(SEARCH_TREE_HALF_EXTENT)),
            SEARCH_TREE_SPLIT_THRESHOLD,
            SEARCH_TREE_MAX_DEPTH,
        )
    }
}

impl<T: Copy + Eq + Hash> QuadTree<T> {
    pub fn new(bounds: Rect, split_threshold: usize, max_depth: u8) -> Self {
        Self {
            nodes: vec![Node::new(bounds, 0)],
            slots: HashMap::new(),
            split_threshold: split_threshold.max(1),
            max_depth,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, item: T) -> bool {
        self.slots.contains_key(&item)
    }

    /// Bounds stored for `item`, if indexed.
    pub fn bounds_of(&self, item: T) -> Option<Rect> {
        let node = *self.slots.get(&item)?;
        self.nodes[node]
            .items
            .iter()
            .find(|(_, it)| *it == item)
            .map(|(rect, _)| *rect)
    }

    pub fn clear(&mut self) {
        let root = self.nodes[0].bounds;
        self.nodes.clear();
        self.nodes.push(Node::new(root, 0));
        self.slots.clear();
    }

    /// Add `item`. An item that is already indexed is moved to `bounds`.
    pub fn insert(&mut self, item: T, bounds: Rect) {
        if self.slots.contains_key(&item) {
            self.remove(item);
        }
        let node = self.descend(bounds);
        self.nodes[node].items.push((bounds, item));
        self.slots.insert(item, node);
        self.maybe_split(node);
    }

    /// Move `item` to `bounds`, inserting it if absent.
    pub fn update(&mut self, item: T, bounds: Rect) {
        self.insert(item, bounds);
    }

    /// Remove `item`. Returns false if it was not indexed.
    pub fn remove(&mut self, item: T) -> bool {
        let Some(node) = self.slots.remove(&item) else {
            return false;
        };
        let items = &mut self.nodes[node].items;
        if let Some(pos) = items.iter().position(|(_, it)| *it == item) {
            items.swap_remove(pos);
        }
        true
    }

    /// Deepest existing node whose square fully contains `bounds`.
    fn descend(&self, bounds: Rect) -> usize {
        let mut current = 0;
        loop {
            let Some(children) = self.nodes[current].children else {
                return current;
            };
            match children
                .iter()
                .copied()
                .find(|&child| contains_rect(self.nodes[child].bounds, bounds))
            {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    fn maybe_split(&mut self, node: usize) {
        let (bounds, depth) = {
            let n = &self.nodes[node];
            if n.children.is_some()
                || n.items.len() <= self.split_threshold
                || n.depth >= self.max_depth
            {
                return;
            }
            (n.bounds, n.depth)
        };

        let center = bounds.center();
        let quadrants = [
            Rect::from_corners(bounds.min, center),
            Rect::from_corners(
                Vec2::new(center.x, bounds.min.y),
                Vec2::new(bounds.max.x, center.y),
            ),
            Rect::from_corners(
                Vec2::new(bounds.min.x, center.y),
                Vec2::new(center.x, bounds.max.y),
            ),
            Rect::from_corners(center, bounds.max),
        ];
        let first = self.nodes.len();
        for quadrant in quadrants {
            self.nodes.push(Node::new(quadrant, depth + 1));
        }
        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[node].children = Some(children);

        let items = std::mem::take(&mut self.nodes[node].items);
        let mut moved = Vec::new();
        for (rect, item) in items {
            match children
                .iter()
                .copied()
                .find(|&child| contains_rect(self.nodes[child].bounds, rect))
            {
                Some(child) => {
                    self.nodes[child].items.push((rect, item));
                    self.slots.insert(item, child);
                    moved.push(child);
                }
                None => self.nodes[node].items.push((rect, item)),
            }
        }
        moved.sort_unstable();
        moved.dedup();
        for child in moved {
            self.maybe_split(child);
        }
    }
}

impl<T: Copy + Eq + Hash> SpatialIndexReader<T> for QuadTree<T> {
    fn iterate<V: SpatialVisitor<T>>(&self, visitor: &mut V) {
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            // The root may hold items outside its square, so it is always
            // entered.
            if index != 0 && !visitor.intersect(&node.bounds) {
                continue;
            }
            for (rect, item) in &node.items {
                if visitor.intersect(rect) {
                    visitor.visit(rect, *item);
                }
            }
            if let Some(children) = node.children {
                stack.extend(children.iter().rev());
            }
        }
    }
}

fn contains_rect(outer: Rect, inner: Rect) -> bool {
    outer.min.x <= inner.min.x
        && outer.min.y <= inner.min.y
        && outer.max.x >= inner.max.x
        && outer.max.y >= inner.max.y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> QuadTree<u32> {
        QuadTree::new(Rect::new(-64.0, -64.0, 64.0, 64.0), 2, 4)
    }

    fn square(x: f32, y: f32, half: f32) -> Rect {
        Rect::from_center_half_size(Vec2::new(x, y), Vec2::splat(half))
    }

    fn query(tree: &QuadTree<u32>, area: Rect) -> Vec<u32> {
        let mut found = Vec::new();
        tree.for_each_in(area, |_, item| found.push(item));
        found.sort_unstable();
        found
    }

    #[test]
    fn test_insert_and_query() {
        let mut tree = small_tree();
        tree.insert(1, square(10.0, 10.0, 1.0));
        tree.insert(2, square(-30.0, 20.0, 1.0));
        tree.insert(3, square(40.0, -40.0, 1.0));
        assert_eq!(tree.len(), 3);
        assert_eq!(query(&tree, square(10.0, 10.0, 5.0)), vec![1]);
        assert_eq!(query(&tree, Rect::new(-64.0, -64.0, 64.0, 64.0)), vec![1, 2, 3]);
        assert!(query(&tree, square(0.0, -50.0, 2.0)).is_empty());
    }

    #[test]
    fn test_split_keeps_every_item_reachable() {
        let mut tree = small_tree();
        for i in 0..64u32 {
            let x = (i % 8) as f32 * 14.0 - 56.0;
            let y = (i / 8) as f32 * 14.0 - 56.0;
            tree.insert(i, square(x, y, 0.5));
        }
        assert_eq!(tree.len(), 64);
        assert!(tree.nodes.len() > 1, "tree should have split");
        let all = query(&tree, Rect::new(-64.0, -64.0, 64.0, 64.0));
        assert_eq!(all, (0..64).collect::<Vec<_>>());
        for i in 0..64u32 {
            let rect = tree.bounds_of(i).unwrap();
            assert!(query(&tree, rect).contains(&i));
        }
    }

    #[test]
    fn test_straddling_item_stays_at_parent() {
        let mut tree = small_tree();
        for i in 0..4u32 {
            tree.insert(i, square(30.0 + i as f32, 30.0, 0.5));
        }
        // Crosses the origin, so no child can hold it.
        tree.insert(99, square(0.0, 0.0, 4.0));
        assert_eq!(tree.slots[&99], 0);
        assert_eq!(query(&tree, square(-1.0, -1.0, 0.5)), vec![99]);
    }

    #[test]
    fn test_item_outside_root_is_still_found() {
        let mut tree = small_tree();
        tree.insert(5, square(500.0, 500.0, 1.0));
        assert_eq!(query(&tree, square(500.0, 500.0, 2.0)), vec![5]);
    }

    #[test]
    fn test_update_moves_item() {
        let mut tree = small_tree();
        tree.insert(1, square(10.0, 10.0, 1.0));
        tree.update(1, square(-40.0, -40.0, 1.0));
        assert_eq!(tree.len(), 1);
        assert!(query(&tree, square(10.0, 10.0, 2.0)).is_empty());
        assert_eq!(query(&tree, square(-40.0, -40.0, 2.0)), vec![1]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut tree = small_tree();
        tree.insert(1, square(10.0, 10.0, 1.0));
        tree.insert(2, square(20.0, 10.0, 1.0));
        assert!(tree.remove(1));
        assert!(!tree.remove(1));
        assert!(!tree.contains(1));
        assert_eq!(query(&tree, square(15.0, 10.0, 10.0)), vec![2]);
        tree.clear();
        assert!(tree.is_empty());
        assert!(query(&tree, square(15.0, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn test_visitor_can_prune() {
        struct CountNodes(usize);
        impl SpatialVisitor<u32> for CountNodes {
            fn intersect(&mut self, _bounds: &Rect) -> bool {
                self.0 += 1;
                false
            }
            fn visit(&mut self, _bounds: &Rect, _item: u32) {
                panic!("pruned visitor should never visit");
            }
        }
        let mut tree = small_tree();
        for i in 0..16u32 {
            tree.insert(i, square(i as f32 * 3.0, 0.0, 0.5));
        }
        let mut visitor = CountNodes(0);
        tree.iterate(&mut visitor);
        assert!(visitor.0 > 0);
    }
}
