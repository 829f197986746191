//! Pools keyed by delimited string paths, such as `//assets/textures/stone`.
//!
//! Every identifier starts with the root identifier, and a child identifier is its parent's
//! identifier, a separator, and the child's name. Two root conventions are common:
//!
//! | convention | root id | child of root | grandchild |
//! |---|---|---|---|
//! | [`RootConvention::Empty`] | `""` | `/foo` | `/foo/bar` |
//! | [`RootConvention::Separator`] | `/` | `//foo` | `//foo/bar` |

use std::hash::Hash;

use super::{IdScheme, Pool};

/// `parent`, then `separator`, then `relative`.
pub fn combine(parent: &str, relative: &str, separator: char) -> String {
    let mut id = String::with_capacity(parent.len() + relative.len() + separator.len_utf8());
    id.push_str(parent);
    id.push(separator);
    id.push_str(relative);
    id
}

/// Everything before the last `separator`, or `None` when `id` has no separator.
pub fn path_up(id: &str, separator: char) -> Option<&str> {
    id.rfind(separator).map(|i| &id[..i])
}

/// Which identifier the root gets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RootConvention {
    /// The root is `""`, its children start with one separator.
    #[default]
    Empty,
    /// The root is the separator itself, its children start with two.
    Separator,
}

impl RootConvention {
    pub fn root_id(self, separator: char) -> String {
        match self {
            RootConvention::Empty => String::new(),
            RootConvention::Separator => separator.to_string(),
        }
    }
}

/// The [`IdScheme`] of path identifiers. Elements are named by `name`.
#[derive(Clone, Debug)]
pub struct PathScheme<F> {
    separator: char,
    root_id: String,
    name: F,
}

impl<F> PathScheme<F> {
    pub fn new(separator: char, convention: RootConvention, name: F) -> Self {
        PathScheme {
            separator,
            root_id: convention.root_id(separator),
            name,
        }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Does `id` lie strictly below the root identifier?
    fn is_below_root(&self, id: &str) -> bool {
        id.strip_prefix(self.root_id.as_str())
            .is_some_and(|rest| rest.starts_with(self.separator))
    }
}

impl<E, F> IdScheme<String, E> for PathScheme<F>
where
    F: Fn(&E) -> String,
{
    fn relative_id_of(&self, child: &E) -> String {
        (self.name)(child)
    }

    fn child_id_of(&self, relative: &String, parent: &String) -> String {
        combine(parent, relative, self.separator)
    }

    fn parent_id_of(&self, child: &String) -> Option<String> {
        if !self.is_below_root(child) {
            return None;
        }
        path_up(child, self.separator).map(str::to_owned)
    }
}

/// A [`Pool`] of path identifiers.
pub type PathPool<E, F> = Pool<String, E, PathScheme<F>>;

impl<E, F> Pool<String, E, PathScheme<F>>
where
    E: Hash + Eq + Clone,
    F: Fn(&E) -> String,
{
    /// Creates a path pool holding only `root`, mapped under the root id of `convention`.
    pub fn with_root(root: E, separator: char, convention: RootConvention, name: F) -> Self {
        let scheme = PathScheme::new(separator, convention, name);
        let root_id = scheme.root_id.clone();
        Pool::new(root, root_id, scheme)
    }

    pub fn separator(&self) -> char {
        self.scheme().separator()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    type Naming = fn(&&str) -> String;

    fn name_of(name: &&str) -> String {
        name.to_string()
    }

    fn scheme(convention: RootConvention) -> PathScheme<Naming> {
        PathScheme::new('/', convention, name_of as Naming)
    }

    #[test]
    fn combine_and_path_up() {
        assert_eq!(combine("//foo", "bar", '/'), "//foo/bar");
        assert_eq!(combine("", "foo", '.'), ".foo");
        assert_eq!(path_up("//foo/bar", '/'), Some("//foo"));
        assert_eq!(path_up("/foo", '/'), Some(""));
        assert_eq!(path_up("foo", '/'), None);
    }

    #[test]
    fn separator_root_parents() {
        let scheme = scheme(RootConvention::Separator);
        let parent = |id: &str| IdScheme::<String, &str>::parent_id_of(&scheme, &id.to_string());

        assert_eq!(parent("//foo/bar").as_deref(), Some("//foo"));
        assert_eq!(parent("//foo").as_deref(), Some("/"));
        assert_eq!(parent("/"), None);
        assert_eq!(parent("/foo"), None);
        assert_eq!(parent("foo/bar"), None);
    }

    #[test]
    fn empty_root_parents() {
        let scheme = scheme(RootConvention::Empty);
        let parent = |id: &str| IdScheme::<String, &str>::parent_id_of(&scheme, &id.to_string());

        assert_eq!(parent("/foo/bar").as_deref(), Some("/foo"));
        assert_eq!(parent("/foo").as_deref(), Some(""));
        assert_eq!(parent(""), None);
        assert_eq!(parent("foo"), None);
    }

    #[test]
    fn child_ids_lead_back_to_parent() {
        let scheme = scheme(RootConvention::Separator);
        let relative = IdScheme::<String, &str>::relative_id_of(&scheme, &"baz");
        let child = IdScheme::<String, &str>::child_id_of(&scheme, &relative, &"//foo".to_string());

        assert_eq!(child, "//foo/baz");
        assert_eq!(
            IdScheme::<String, &str>::parent_id_of(&scheme, &child).as_deref(),
            Some("//foo")
        );
    }
}
