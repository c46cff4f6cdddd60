//! SQL data types as they appear in casts and column definitions

use std::fmt;

use smol_str::SmolStr;

/// A data type name with optional arguments, e.g. `varchar(40)` or
/// `numeric(10, 2)`. Original casing is preserved; [`SqlType::canonical`]
/// gives the comparison form used by the DDL differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlType {
    pub name: SmolStr,
    pub args: Vec<SmolStr>,
    /// `[]` suffix for array types
    pub array: bool,
}

impl SqlType {
    pub fn named(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            array: false,
        }
    }

    pub fn with_args(name: impl Into<SmolStr>, args: Vec<SmolStr>) -> Self {
        Self {
            name: name.into(),
            args,
            array: false,
        }
    }

    /// Uppercased, whitespace-free comparison form
    pub fn canonical(&self) -> String {
        let mut out = self.name.to_ascii_uppercase();
        if !self.args.is_empty() {
            out.push('(');
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&arg.to_ascii_uppercase());
            }
            out.push(')');
        }
        if self.array {
            out.push_str("[]");
        }
        out
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            write!(f, "({})", self.args.join(", "))?;
        }
        if self.array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}
