use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// N-ary tree stored in an arena.
///
/// Several trees share one [`NodeMap`]: every dock root, every floating
/// window root and every ghost is a separate tree inside the same forest, so
/// subtrees move between them by relinking keys.
#[derive(Serialize, Deserialize)]
pub struct Tree<O> {
    pub map: NodeMap,
    pub data: O,
}

impl Tree<()> {
    pub fn new() -> Self { Self::with_observer(()) }
}

impl Default for Tree<()> {
    fn default() -> Self { Self::new() }
}

impl<O: Observer> Tree<O> {
    pub fn with_observer(data: O) -> Self { Tree { map: NodeMap::new(), data } }

    pub fn mk_node(&mut self) -> UnattachedNode<'_, O> {
        let id = self.map.map.insert(Node::default());
        self.data.added_to_forest(&self.map, id);
        UnattachedNode { id, tree: self }
    }
}

/// Map that holds the structure of the forest.
#[derive(Serialize, Deserialize)]
pub struct NodeMap {
    map: SlotMap<NodeId, Node>,
}

impl NodeMap {
    fn new() -> NodeMap { NodeMap { map: SlotMap::default() } }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    pub fn contains(&self, id: NodeId) -> bool { self.map.contains_key(id) }
}

impl Index<NodeId> for NodeMap {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output { &self.map[index] }
}

impl IndexMut<NodeId> for NodeMap {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output { &mut self.map[index] }
}

slotmap::new_key_type! {
    /// Represents a node somewhere in the forest.
    pub struct NodeId;
}

impl NodeId {
    pub fn detach<'a, O: Observer>(self, tree: &'a mut Tree<O>) -> DetachedNode<'a, O> {
        DetachedNode { id: self, tree }
    }

    pub fn parent(self, map: &NodeMap) -> Option<NodeId> { map.map.get(self).and_then(|n| n.parent) }

    pub fn children(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        ChildIterator {
            cur: map.map.get(self).and_then(|n| n.first_child),
            map,
        }
    }

    pub fn children_rev(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        ChildRevIterator {
            cur: map.map.get(self).and_then(|n| n.last_child),
            map,
        }
    }

    pub fn child_count(self, map: &NodeMap) -> usize { self.children(map).count() }

    pub fn nth_child(self, map: &NodeMap, index: usize) -> Option<NodeId> {
        self.children(map).nth(index)
    }

    /// Index of this node among its siblings.
    pub fn child_index(self, map: &NodeMap) -> Option<usize> {
        let parent = self.parent(map)?;
        parent.children(map).position(|c| c == self)
    }

    pub fn traverse_postorder(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        PostorderTraversal::new(map, self)
    }

    pub fn traverse_preorder(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        PreorderTraversal::new(map, self)
    }

    /// Returns an iterator over all ancestors of the current node, including itself.
    pub fn ancestors(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let node = next;
            next = node.and_then(|n| map.map.get(n).and_then(|nd| nd.parent));
            node
        })
    }

    /// The root of the tree this node currently belongs to.
    pub fn root(self, map: &NodeMap) -> NodeId { self.ancestors(map).last().unwrap_or(self) }

    /// Number of edges between this node and its root.
    pub fn depth(self, map: &NodeMap) -> usize { self.ancestors(map).count().saturating_sub(1) }

    pub fn next_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.next_sibling)
    }

    pub fn prev_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.prev_sibling)
    }

    pub fn first_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.first_child)
    }

    pub fn last_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.last_child)
    }

    pub fn is_empty(self, map: &NodeMap) -> bool {
        map.map.get(self).map(|n| n.first_child.is_none()).unwrap_or(true)
    }

    /// Deletes a node that has no parent, together with its subtree.
    pub fn remove_root<O: Observer>(self, tree: &mut Tree<O>) {
        debug_assert!(self.parent(&tree.map).is_none(), "remove_root called on non-root node");
        if let Some(node) = tree.map.map.remove(self) {
            node.delete_recursive(tree, self);
        }
    }
}

pub trait Observer
where Self: Sized {
    fn added_to_forest(&mut self, map: &NodeMap, node: NodeId);
    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId);
}

impl Observer for () {
    fn added_to_forest(&mut self, _map: &NodeMap, _node: NodeId) {}

    fn added_to_parent(&mut self, _map: &NodeMap, _node: NodeId) {}

    fn removing_from_parent(&mut self, _map: &NodeMap, _node: NodeId) {}

    fn removed_from_forest(&mut self, _map: &NodeMap, _node: NodeId) {}
}

#[must_use = "Unattached nodes should be inserted into the tree or kept as a root"]
pub struct UnattachedNode<'a, O> {
    id: NodeId,
    tree: &'a mut Tree<O>,
}

impl<'a, O: Observer> UnattachedNode<'a, O> {
    /// Keeps the node as the root of its own tree.
    pub fn into_root(self) -> NodeId { self.id }

    pub fn push_back(self, parent: NodeId) -> NodeId {
        self.id.link_under_back(parent, &mut self.tree.map);
        self.tree.data.added_to_parent(&self.tree.map, self.id);
        self.id
    }

    /// Inserts the node as child number `index` of `parent`, appending when
    /// `index` is past the end.
    pub fn insert_at(self, parent: NodeId, index: usize) -> NodeId {
        self.id.link_under_at(parent, index, &mut self.tree.map);
        self.tree.data.added_to_parent(&self.tree.map, self.id);
        self.id
    }
}

#[must_use = "Detached nodes should be reattached to the tree or removed"]
pub struct DetachedNode<'a, O> {
    id: NodeId,
    tree: &'a mut Tree<O>,
}

impl<'a, O: Observer> DetachedNode<'a, O> {
    pub fn push_back(self, parent: NodeId) -> NodeId {
        let count = parent.child_count(&self.tree.map);
        self.insert_at(parent, count)
    }

    pub fn insert_at(mut self, parent: NodeId, index: usize) -> NodeId {
        let id = self.into_root();
        UnattachedNode { id, tree: self.tree }.insert_at(parent, index)
    }

    /// Unlinks the node from its parent but keeps it (and its subtree) alive
    /// as a separate root.
    pub fn into_root(&mut self) -> NodeId {
        if self.id.parent(&self.tree.map).is_some() {
            self.tree.data.removing_from_parent(&self.tree.map, self.id);
            self.tree.map.unlink(self.id);
        }
        self.id
    }

    /// Unlinks the node and deletes it together with its subtree.
    pub fn remove(mut self) {
        let id = self.into_root();
        id.remove_root(self.tree);
    }
}

#[derive(Default, PartialEq, Debug, Serialize, Deserialize)]
pub struct Node {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}

impl NodeId {
    fn link_under_back(self, parent: NodeId, map: &mut NodeMap) {
        if self == parent || !map.contains(self) || !map.contains(parent) {
            return;
        }
        let prev = map.map[parent].last_child;
        {
            let parent_node = &mut map.map[parent];
            parent_node.first_child.get_or_insert(self);
            parent_node.last_child = Some(self);
        }
        let node = &mut map.map[self];
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = None;
        if let Some(prev) = prev {
            map.map[prev].next_sibling = Some(self);
        }
    }

    fn link_under_at(self, parent: NodeId, index: usize, map: &mut NodeMap) {
        match parent.nth_child(map, index) {
            Some(next) => self.link_before(next, map),
            None => self.link_under_back(parent, map),
        }
    }

    fn link_before(self, next: NodeId, map: &mut NodeMap) {
        let Some(parent) = next.parent(map) else { return };
        if self == next || !map.contains(self) {
            return;
        }
        let prev = map.map[next].prev_sibling;
        {
            let node = &mut map.map[self];
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = Some(next);
        }
        map.map[next].prev_sibling = Some(self);
        match prev {
            Some(prev) => map.map[prev].next_sibling = Some(self),
            None => map.map[parent].first_child = Some(self),
        }
    }
}

impl NodeMap {
    fn unlink(&mut self, id: NodeId) {
        let Some((prev_sibling, next_sibling, parent)) =
            self.map.get(id).map(|n| (n.prev_sibling, n.next_sibling, n.parent))
        else {
            return;
        };
        if let Some(prev) = prev_sibling.and_then(|p| self.map.get_mut(p)) {
            prev.next_sibling = next_sibling;
        }
        if let Some(next) = next_sibling.and_then(|n| self.map.get_mut(n)) {
            next.prev_sibling = prev_sibling;
        }
        if let Some(parent_node) = parent.and_then(|p| self.map.get_mut(p)) {
            if parent_node.first_child == Some(id) {
                parent_node.first_child = next_sibling;
            }
            if parent_node.last_child == Some(id) {
                parent_node.last_child = prev_sibling;
            }
        }
        if let Some(node) = self.map.get_mut(id) {
            node.prev_sibling = None;
            node.next_sibling = None;
            node.parent = None;
        }
    }
}

impl Node {
    fn delete_recursive(&self, cx: &mut Tree<impl Observer>, id: NodeId) {
        cx.data.removed_from_forest(&cx.map, id);
        let mut iter = self.first_child;
        while let Some(child) = iter {
            let next = cx.map.map.get(child).and_then(|n| n.next_sibling);
            if let Some(node) = cx.map.map.remove(child) {
                node.delete_recursive(cx, child);
            }
            iter = next;
        }
    }
}

struct ChildIterator<'a> {
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> Iterator for ChildIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.map.map.get(id).and_then(|n| n.next_sibling);
        Some(id)
    }
}

struct ChildRevIterator<'a> {
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> Iterator for ChildRevIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.map.map.get(id).and_then(|n| n.prev_sibling);
        Some(id)
    }
}

struct PostorderTraversal<'a> {
    cur: Option<NodeId>,
    top: NodeId,
    map: &'a NodeMap,
}

impl<'a> PostorderTraversal<'a> {
    fn new(map: &'a NodeMap, root: NodeId) -> Self {
        Self {
            top: root,
            cur: Some(Self::descend_left(root, map)),
            map,
        }
    }

    fn descend_left(mut node: NodeId, map: &'a NodeMap) -> NodeId {
        while let Some(child) = node.first_child(map) {
            node = child;
        }
        node
    }
}

impl<'a> Iterator for PostorderTraversal<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cur?;
        self.cur = None;
        if node != self.top {
            if let Some(next) = node.next_sibling(self.map) {
                self.cur = Some(Self::descend_left(next, self.map));
            } else {
                self.cur = node.parent(self.map);
            }
        }
        Some(node)
    }
}

struct PreorderTraversal<'a> {
    top: NodeId,
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> PreorderTraversal<'a> {
    fn new(map: &'a NodeMap, root: NodeId) -> Self {
        Self {
            top: root,
            cur: Some(root),
            map,
        }
    }
}

impl<'a> Iterator for PreorderTraversal<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cur?;
        if let Some(child) = node.first_child(self.map) {
            self.cur = Some(child);
        } else {
            self.cur = None;
            for ancestor in node.ancestors(self.map) {
                if ancestor == self.top {
                    break;
                }
                if let Some(sibling) = ancestor.next_sibling(self.map) {
                    self.cur = Some(sibling);
                    break;
                }
            }
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// ```text
    ///        root          other
    ///       /  |  \
    ///     c1  c2  c3
    ///          |
    ///         gc1
    /// ```
    struct TestTree {
        tree: Tree<Events>,
        root: NodeId,
        c1: NodeId,
        c2: NodeId,
        c3: NodeId,
        gc1: NodeId,
        other: NodeId,
    }

    impl TestTree {
        fn new() -> Self {
            let mut tree = Tree::with_observer(Events(vec![]));
            let root = tree.mk_node().into_root();
            let c1 = tree.mk_node().push_back(root);
            let c2 = tree.mk_node().push_back(root);
            let c3 = tree.mk_node().push_back(root);
            let gc1 = tree.mk_node().push_back(c2);
            let other = tree.mk_node().into_root();
            tree.data.0.clear();
            TestTree { tree, root, c1, c2, c3, gc1, other }
        }

        fn children(&self, node: NodeId) -> Vec<NodeId> { node.children(&self.tree.map).collect() }

        #[track_caller]
        fn assert_children_are(&self, children: &[NodeId], parent: NodeId) {
            assert_eq!(children, self.children(parent).as_slice());
            let rev: Vec<_> = parent.children_rev(&self.tree.map).collect();
            assert_eq!(children.iter().copied().rev().collect::<Vec<_>>(), rev);
            for child in children {
                assert_eq!(Some(parent), child.parent(&self.tree.map));
            }
        }
    }

    #[derive(Clone, PartialEq, Debug)]
    enum TreeEvent {
        AddedToForest(NodeId),
        AddedToParent(NodeId),
        RemovingFromParent(NodeId, NodeId),
        RemovedFromForest(NodeId),
    }
    use TreeEvent::*;

    struct Events(Vec<TreeEvent>);

    impl Observer for Events {
        fn added_to_forest(&mut self, _map: &NodeMap, node: NodeId) { self.0.push(AddedToForest(node)) }

        fn added_to_parent(&mut self, _map: &NodeMap, node: NodeId) { self.0.push(AddedToParent(node)) }

        fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId) {
            let parent = node.parent(map).expect("removing_from_parent without parent");
            self.0.push(RemovingFromParent(node, parent))
        }

        fn removed_from_forest(&mut self, _map: &NodeMap, node: NodeId) {
            self.0.push(RemovedFromForest(node))
        }
    }

    #[test]
    fn children_in_order() {
        let t = TestTree::new();
        t.assert_children_are(&[t.c1, t.c2, t.c3], t.root);
        t.assert_children_are(&[t.gc1], t.c2);
        assert!(t.children(t.other).is_empty());
        assert_eq!(3, t.root.child_count(&t.tree.map));
        assert_eq!(Some(t.c3), t.root.nth_child(&t.tree.map, 2));
        assert_eq!(Some(1), t.c2.child_index(&t.tree.map));
        assert_eq!(None, t.root.child_index(&t.tree.map));
    }

    #[test]
    fn ancestors_root_and_depth() {
        let t = TestTree::new();
        let ancestors: Vec<_> = t.gc1.ancestors(&t.tree.map).collect();
        assert_eq!(vec![t.gc1, t.c2, t.root], ancestors);
        assert_eq!(t.root, t.gc1.root(&t.tree.map));
        assert_eq!(2, t.gc1.depth(&t.tree.map));
        assert_eq!(0, t.other.depth(&t.tree.map));
    }

    #[test]
    fn traversals() {
        let t = TestTree::new();
        let post: Vec<_> = t.root.traverse_postorder(&t.tree.map).collect();
        assert_eq!(vec![t.c1, t.gc1, t.c2, t.c3, t.root], post);
        let pre: Vec<_> = t.root.traverse_preorder(&t.tree.map).collect();
        assert_eq!(vec![t.root, t.c1, t.c2, t.gc1, t.c3], pre);
        let pre_c2: Vec<_> = t.c2.traverse_preorder(&t.tree.map).collect();
        assert_eq!(vec![t.c2, t.gc1], pre_c2);
    }

    #[test]
    fn insert_at_positions() {
        let mut t = TestTree::new();
        let first = t.tree.mk_node().insert_at(t.root, 0);
        let middle = t.tree.mk_node().insert_at(t.root, 2);
        let last = t.tree.mk_node().insert_at(t.root, 99);
        t.assert_children_are(&[first, t.c1, middle, t.c2, t.c3, last], t.root);
    }

    #[test]
    fn move_between_parents() {
        let mut t = TestTree::new();
        t.c1.detach(&mut t.tree).push_back(t.other);
        t.assert_children_are(&[t.c2, t.c3], t.root);
        t.assert_children_are(&[t.c1], t.other);
        assert_eq!(
            vec![RemovingFromParent(t.c1, t.root), AddedToParent(t.c1)],
            t.tree.data.0
        );
    }

    #[test]
    fn reorder_within_parent() {
        let mut t = TestTree::new();
        t.c3.detach(&mut t.tree).insert_at(t.root, 0);
        t.assert_children_are(&[t.c3, t.c1, t.c2], t.root);
    }

    #[test]
    fn detach_into_root_keeps_subtree() {
        let mut t = TestTree::new();
        let id = t.c2.detach(&mut t.tree).into_root();
        assert_eq!(t.c2, id);
        t.assert_children_are(&[t.c1, t.c3], t.root);
        assert_eq!(None, t.c2.parent(&t.tree.map));
        t.assert_children_are(&[t.gc1], t.c2);
        assert!(t.tree.map.contains(t.gc1));
    }

    #[test]
    fn remove_deletes_subtree() {
        let mut t = TestTree::new();
        t.c2.detach(&mut t.tree).remove();
        t.assert_children_are(&[t.c1, t.c3], t.root);
        assert!(!t.tree.map.contains(t.c2));
        assert!(!t.tree.map.contains(t.gc1));
        assert_eq!(
            vec![
                RemovingFromParent(t.c2, t.root),
                RemovedFromForest(t.c2),
                RemovedFromForest(t.gc1)
            ],
            t.tree.data.0
        );
    }

    #[test]
    fn remove_only_child_clears_links() {
        let mut t = TestTree::new();
        t.gc1.detach(&mut t.tree).remove();
        assert!(t.c2.is_empty(&t.tree.map));
        assert_eq!(None, t.c2.first_child(&t.tree.map));
        assert_eq!(None, t.c2.last_child(&t.tree.map));
    }
}
