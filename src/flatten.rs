//! Depth-first flattening of the selected subtrees.

use crate::model::ElementSource;
use std::slice;

/// Lazy pre-order walk over one or more root subtrees.
///
/// Each root is yielded followed by its whole subtree, children in their
/// stored order. Roots are walked independently: a root nested inside another
/// selected root is visited again in its own slot. A node whose children
/// cannot be read is treated as a leaf.
pub struct Flatten<'a, E> {
    roots: std::vec::IntoIter<&'a E>,
    stack: Vec<slice::Iter<'a, E>>,
}

/// Flatten the subtrees under `roots` into one traversal sequence.
pub fn flatten<'a, E, I>(roots: I) -> Flatten<'a, E>
where
    E: ElementSource,
    I: IntoIterator<Item = &'a E>,
{
    Flatten {
        roots: roots.into_iter().collect::<Vec<_>>().into_iter(),
        stack: Vec::new(),
    }
}

impl<'a, E: ElementSource> Flatten<'a, E> {
    fn descend(&mut self, node: &'a E) {
        match node.children() {
            Ok(children) if !children.is_empty() => self.stack.push(children.iter()),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    element = node.display_name().unwrap_or("Unknown"),
                    error = %err,
                    "treating element as leaf"
                );
            }
        }
    }
}

impl<'a, E: ElementSource> Iterator for Flatten<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(level) = self.stack.last_mut() {
            if let Some(node) = level.next() {
                self.descend(node);
                return Some(node);
            }
            self.stack.pop();
        }

        let root = self.roots.next()?;
        self.descend(root);
        Some(root)
    }
}
