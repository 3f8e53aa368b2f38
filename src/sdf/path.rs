//! Scene description path.

use std::{fmt, str::FromStr, sync::Arc};

use anyhow::{bail, ensure, Context, Result};

const SEPARATOR: char = '/';

/// A path to a prim in the scene graph namespace, e.g. `/World/Set_1/Prop_1`.
///
/// Paths are cheap to clone (the text is shared). The empty path is used as the
/// "no path" sentinel and is what `Path::default()` returns.
///
/// Paths order element-wise, which for the restricted prim-name alphabet is the
/// same as ordering their text: `/` sorts before every name character, so a path
/// is immediately followed by its descendants in an ordered map.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    text: Arc<str>,
}

impl Path {
    /// Parse and validate a prim path.
    ///
    /// Accepts the absolute root `/`, absolute prim paths (`/A/B`) and relative
    /// prim paths (`A/B`) whose element names are identifiers.
    pub fn new(path: &str) -> Result<Self> {
        ensure!(!path.is_empty(), "Empty path is not a valid prim path");

        if path == "/" {
            return Ok(Self::abs_root());
        }

        let elements = path.strip_prefix(SEPARATOR).unwrap_or(path);
        ensure!(!elements.ends_with(SEPARATOR), "Trailing separator in path: <{path}>");

        for name in elements.split(SEPARATOR) {
            validate_name(name).with_context(|| format!("Invalid prim path: <{path}>"))?;
        }

        Ok(Self::from_validated(path))
    }

    /// Wraps text that is already known to be a well-formed path.
    pub(crate) fn from_validated(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    /// The absolute root path `/`.
    pub fn abs_root() -> Self {
        Self::from_validated("/")
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_absolute_path(&self) -> bool {
        self.text.starts_with(SEPARATOR)
    }

    pub fn is_absolute_root_path(&self) -> bool {
        &*self.text == "/"
    }

    /// Returns true for single-element absolute paths such as `/World`.
    pub fn is_root_prim_path(&self) -> bool {
        self.is_absolute_path() && !self.is_absolute_root_path() && !self.text[1..].contains(SEPARATOR)
    }

    /// Number of name elements, `0` for the absolute root and the empty path.
    pub fn path_element_count(&self) -> usize {
        if self.is_empty() || self.is_absolute_root_path() {
            return 0;
        }
        self.elements().count()
    }

    /// Iterates the name elements from the outermost down.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        let body = self.text.strip_prefix(SEPARATOR).unwrap_or(&self.text);
        body.split(SEPARATOR).filter(|name| !name.is_empty())
    }

    /// The last name element, or an empty string for the absolute root.
    pub fn name(&self) -> &str {
        match self.text.rfind(SEPARATOR) {
            Some(pos) => &self.text[pos + 1..],
            None => &self.text,
        }
    }

    /// Returns the parent path.
    ///
    /// The parent of a root prim is `/`. The absolute root, single-element
    /// relative paths and the empty path have an empty parent.
    pub fn parent(&self) -> Path {
        if self.is_empty() || self.is_absolute_root_path() {
            return Path::default();
        }

        match self.text.rfind(SEPARATOR) {
            Some(0) => Path::abs_root(),
            Some(pos) => Path::from_validated(&self.text[..pos]),
            None => Path::default(),
        }
    }

    /// Appends a child prim name.
    pub fn append_child(&self, name: &str) -> Result<Path> {
        if self.is_empty() {
            bail!("Cannot append child <{name}> to the empty path");
        }
        validate_name(name)?;

        if self.is_absolute_root_path() {
            Ok(Path::from_validated(format!("/{name}")))
        } else {
            Ok(Path::from_validated(format!("{}/{name}", self.text)))
        }
    }

    /// Returns true if `prefix` is this path or one of its ancestors.
    ///
    /// The empty path is nobody's prefix and has no prefixes.
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        if self.is_empty() || prefix.is_empty() {
            return false;
        }
        if prefix.is_absolute_root_path() {
            return self.is_absolute_path();
        }

        match self.text.strip_prefix(&*prefix.text) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }

    /// Replaces `old_prefix` with `new_prefix`.
    ///
    /// Returns a copy of this path unchanged when `old_prefix` is not a prefix.
    pub fn replace_prefix(&self, old_prefix: &Path, new_prefix: &Path) -> Path {
        if !self.has_prefix(old_prefix) || new_prefix.is_empty() {
            return self.clone();
        }

        // Remainder below the old prefix, without a leading separator.
        let rest = if old_prefix.is_absolute_root_path() {
            &self.text[1..]
        } else {
            self.text[old_prefix.text.len()..].trim_start_matches(SEPARATOR)
        };

        if rest.is_empty() {
            new_prefix.clone()
        } else if new_prefix.is_absolute_root_path() {
            Path::from_validated(format!("/{rest}"))
        } else {
            Path::from_validated(format!("{}/{rest}", new_prefix.text))
        }
    }

    /// Iterates this path and its ancestors, innermost first, stopping before
    /// the absolute root.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors { next: self.clone() }
    }
}

/// Iterator returned by [`Path::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Path,
}

impl Iterator for Ancestors {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        if self.next.is_empty() || self.next.is_absolute_root_path() {
            return None;
        }
        let parent = self.next.parent();
        Some(std::mem::replace(&mut self.next, parent))
    }
}

fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        bail!("Empty path element");
    };

    ensure!(
        first == '_' || first.is_ascii_alphabetic(),
        "Prim name must start with a letter or underscore: '{name}'"
    );
    ensure!(
        chars.all(|c| c == '_' || c.is_ascii_alphanumeric()),
        "Prim name must be alphanumeric: '{name}'"
    );

    Ok(())
}

impl FromStr for Path {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Path::new(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        Path::new(value)
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.text)
    }
}
