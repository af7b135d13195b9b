use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::syntax::ConstructKind;

/// A named flag in the active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Flag {
    /// A line-significant construct currently being visited.
    Construct(ConstructKind),
    ClassEnter,
    ClassExit,
    FuncEnter,
    FuncExit,
}

impl Flag {
    /// Synthetic enter/exit flags are always line-significant.
    pub fn is_line_significant(self) -> bool {
        match self {
            Flag::Construct(kind) => kind.is_line_significant(),
            Flag::ClassEnter | Flag::ClassExit | Flag::FuncEnter | Flag::FuncExit => true,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::Construct(kind) => write!(f, "{kind}"),
            Flag::ClassEnter => f.write_str("class_enter"),
            Flag::ClassExit => f.write_str("class_exit"),
            Flag::FuncEnter => f.write_str("func_enter"),
            Flag::FuncExit => f.write_str("func_exit"),
        }
    }
}

/// Flags active at one point of the traversal.
///
/// Construct flags are reference counted so nested constructs of the same
/// kind (a body inside a body) stay present until the outermost one closes.
/// Enter/exit flags are plain on/off.
#[derive(Debug, Clone, Default)]
pub struct ActiveStateSet {
    present: BTreeMap<Flag, usize>,
}

impl ActiveStateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, flag: Flag) {
        match flag {
            Flag::Construct(_) => *self.present.entry(flag).or_insert(0) += 1,
            _ => {
                self.present.insert(flag, 1);
            }
        }
    }

    /// Undo one `insert`. Enter/exit flags are cleared outright.
    pub fn remove(&mut self, flag: Flag) {
        if let Some(count) = self.present.get_mut(&flag) {
            *count = count.saturating_sub(1);
            if *count == 0 || !matches!(flag, Flag::Construct(_)) {
                self.present.remove(&flag);
            }
        }
    }

    pub fn contains(&self, flag: Flag) -> bool {
        self.present.contains_key(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    /// Line-significant flags currently present.
    pub fn significant(&self) -> BTreeSet<Flag> {
        self.present
            .keys()
            .copied()
            .filter(|flag| flag.is_line_significant())
            .collect()
    }
}

/// The flags recorded for one source line.
///
/// Always carries the two depth counters, whatever the table says about the
/// flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSnapshot {
    pub flags: BTreeSet<Flag>,
    pub open_class_count: usize,
    pub open_func_count: usize,
}

impl TagSnapshot {
    pub fn has(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn enters_class(&self) -> bool {
        self.has(Flag::ClassEnter)
    }

    pub fn exits_class(&self) -> bool {
        self.has(Flag::ClassExit)
    }

    pub fn enters_function(&self) -> bool {
        self.has(Flag::FuncEnter)
    }

    pub fn exits_function(&self) -> bool {
        self.has(Flag::FuncExit)
    }
}

impl fmt::Display for TagSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for flag in &self.flags {
            write!(f, "{flag}, ")?;
        }
        write!(
            f,
            "#class={}, #func={}]",
            self.open_class_count, self.open_func_count
        )
    }
}
