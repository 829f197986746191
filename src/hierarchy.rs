//! Traversal over anything that can list the children of an item.
//!
//! The only thing the walkers here need is [`ChildMany`]: "give me the children of this item,
//! if it is known". Both [`RootedTree`](crate::tree::RootedTree) and
//! [`Pool`](crate::pool::Pool) implement it.
//!
//! All walkers are lazy, single pass and use an explicit stack, so they are safe on deep
//! hierarchies.

/// A hierarchy whose children can be enumerated.
pub trait ChildMany {
    type Item;

    /// The children of `parent`, or `None` when `parent` is not part of the hierarchy.
    fn try_child_get_many<'a>(
        &'a self,
        parent: &Self::Item,
    ) -> Option<impl Iterator<Item = &'a Self::Item> + 'a>;
}

/// A pre-order depth-first iterator: every item comes before its descendants, and siblings
/// come in the order the hierarchy lists them.
pub struct PreOrder<'a, H: ChildMany + ?Sized> {
    hierarchy: &'a H,
    /// Items still to visit, next one on top.
    stack: Vec<&'a H::Item>,
}

impl<H: ChildMany + ?Sized> Clone for PreOrder<'_, H> {
    fn clone(&self) -> Self {
        Self {
            hierarchy: self.hierarchy,
            stack: self.stack.clone(),
        }
    }
}

impl<'a, H: ChildMany + ?Sized> PreOrder<'a, H> {
    /// Creates a pre-order iterator starting at (and including) `start`.
    pub fn new(hierarchy: &'a H, start: &'a H::Item) -> Self {
        PreOrder {
            hierarchy,
            stack: vec![start],
        }
    }
}

impl<'a, H: ChildMany + ?Sized> Iterator for PreOrder<'a, H> {
    type Item = &'a H::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.stack.pop()?;

        // Push children in reverse so the first child is processed next
        if let Some(children) = self.hierarchy.try_child_get_many(item) {
            let children: Vec<_> = children.collect();
            self.stack.extend(children.into_iter().rev());
        }

        Some(item)
    }
}

/// A post-order depth-first iterator: every item comes after all of its descendants.
pub struct PostOrder<'a, H: ChildMany + ?Sized> {
    hierarchy: &'a H,
    /// Items still to visit, with whether their children were already pushed.
    stack: Vec<(&'a H::Item, bool)>,
    include_start: bool,
}

impl<'a, H: ChildMany + ?Sized> PostOrder<'a, H> {
    /// Creates a post-order iterator ending at (and including) `start`.
    pub fn new(hierarchy: &'a H, start: &'a H::Item) -> Self {
        PostOrder {
            hierarchy,
            stack: vec![(start, false)],
            include_start: true,
        }
    }

    /// Like [`new`](Self::new), but stops before yielding `start`.
    pub fn descendants(hierarchy: &'a H, start: &'a H::Item) -> Self {
        PostOrder {
            include_start: false,
            ..Self::new(hierarchy, start)
        }
    }
}

impl<'a, H: ChildMany + ?Sized> Iterator for PostOrder<'a, H> {
    type Item = &'a H::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (item, expanded) = self.stack.pop()?;
            if expanded {
                if self.stack.is_empty() && !self.include_start {
                    return None;
                }
                return Some(item);
            }

            self.stack.push((item, true));
            if let Some(children) = self.hierarchy.try_child_get_many(item) {
                let children: Vec<_> = children.collect();
                self.stack
                    .extend(children.into_iter().rev().map(|child| (child, false)));
            }
        }
    }
}

/// All descendants of `parent` in pre-order, without `parent` itself.
pub fn descendants_pre_order<'a, H: ChildMany + ?Sized>(
    hierarchy: &'a H,
    parent: &'a H::Item,
) -> impl Iterator<Item = &'a H::Item> + 'a {
    PreOrder::new(hierarchy, parent).skip(1)
}

/// All descendants of `parent` in post-order, without `parent` itself.
pub fn descendants_post_order<'a, H: ChildMany + ?Sized>(
    hierarchy: &'a H,
    parent: &'a H::Item,
) -> impl Iterator<Item = &'a H::Item> + 'a {
    PostOrder::descendants(hierarchy, parent)
}

/// Calls `on_visit` on `start` and its descendants, parents first.
pub fn visit_pre_order<'a, H: ChildMany + ?Sized>(
    hierarchy: &'a H,
    start: &'a H::Item,
    on_visit: impl FnMut(&'a H::Item),
) {
    PreOrder::new(hierarchy, start).for_each(on_visit);
}

/// Calls `on_visit` on `start` and its descendants, children first.
pub fn visit_post_order<'a, H: ChildMany + ?Sized>(
    hierarchy: &'a H,
    start: &'a H::Item,
    on_visit: impl FnMut(&'a H::Item),
) {
    PostOrder::new(hierarchy, start).for_each(on_visit);
}

#[cfg(test)]
mod test {
    use ahash::AHashMap;

    use super::*;

    /// A bare adjacency list, to exercise the walkers without a tree.
    struct Adjacency(AHashMap<u8, Vec<u8>>);

    impl ChildMany for Adjacency {
        type Item = u8;

        fn try_child_get_many<'a>(
            &'a self,
            parent: &u8,
        ) -> Option<impl Iterator<Item = &'a u8> + 'a> {
            self.0.get(parent).map(|children| children.iter())
        }
    }

    fn sample() -> Adjacency {
        // 0 -> {1, 4}, 1 -> {2, 3}
        Adjacency(AHashMap::from_iter([
            (0, vec![1, 4]),
            (1, vec![2, 3]),
            (2, vec![]),
            (3, vec![]),
            (4, vec![]),
        ]))
    }

    #[test]
    fn pre_order_visits_parents_first() {
        let h = sample();
        let order: Vec<u8> = PreOrder::new(&h, &0).copied().collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn post_order_visits_children_first() {
        let h = sample();
        let order: Vec<u8> = PostOrder::new(&h, &0).copied().collect();
        assert_eq!(order, vec![2, 3, 1, 4, 0]);
    }

    #[test]
    fn descendants_exclude_start() {
        let h = sample();
        let pre: Vec<u8> = descendants_pre_order(&h, &1).copied().collect();
        let post: Vec<u8> = descendants_post_order(&h, &0).copied().collect();
        assert_eq!(pre, vec![2, 3]);
        assert_eq!(post, vec![2, 3, 1, 4]);
    }

    #[test]
    fn unknown_start_is_visited_alone() {
        let h = sample();
        let mut seen = vec![];
        visit_post_order(&h, &9, |i| seen.push(*i));
        assert_eq!(seen, vec![9]);
        assert_eq!(descendants_pre_order(&h, &9).count(), 0);
    }
}
