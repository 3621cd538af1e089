//! Usage documentation for a specification
//!
//! Renders every variable a specification reads, with its type description,
//! default, required flag and description. Four formats are available:
//!
//! - [`Format::Table`]: aligned columns under a short header (the default)
//! - [`Format::List`]: one block per variable
//! - [`Format::Json`]: an array of [`UsageEntry`] objects
//! - [`Format::Template`]: a per-variable template with `{key}`, `{type}`,
//!   `{default}`, `{required}` and `{description}` placeholders. `{{` and `}}`
//!   produce literal braces.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::EnvError;
use crate::options::Options;
use crate::variable::Variable;
use crate::walk::{gather, Specification};

/// Text printed above the table and list formats.
pub const USAGE_HEADER: &str = "This application is configured via the environment. The following environment\nvariables can be used:\n";

const COLUMN_PADDING: usize = 4;

/// One row of usage output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageEntry {
    pub key: String,
    #[serde(rename = "type")]
    pub type_description: String,
    pub default: Option<String>,
    pub required: bool,
    pub description: String,
}

impl UsageEntry {
    fn from_variable(var: &Variable<'_>) -> Self {
        Self {
            key: var.key().to_string(),
            type_description: var.type_description().to_string(),
            default: var.default_value().map(str::to_string),
            required: var.is_required(),
            description: var.description().unwrap_or_default().to_string(),
        }
    }

    fn default_text(&self) -> &str {
        self.default.as_deref().unwrap_or_default()
    }

    fn required_text(&self) -> &'static str {
        if self.required {
            "true"
        } else {
            ""
        }
    }
}

/// Output format for [`usage_to`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Table,
    List,
    Json,
    /// Rendered once per variable, in declaration order.
    Template(String),
}

/// Usage rows for `spec`, in declaration order.
pub fn entries<S: Specification + ?Sized>(
    spec: &mut S,
    opts: &Options,
) -> Result<Vec<UsageEntry>, EnvError> {
    Ok(gather(spec, opts)?
        .iter()
        .map(UsageEntry::from_variable)
        .collect())
}

/// Print the usage table to stdout.
pub fn usage<S: Specification + ?Sized>(spec: &mut S, opts: &Options) -> Result<(), EnvError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    usage_to(spec, opts, &mut out, &Format::Table)
}

/// Write usage for `spec` to `out` in the given format.
///
/// ```rust
/// use envbind::{usage_to, Format, Options, Specification};
///
/// #[derive(Default, Specification)]
/// struct Config {
///     /// Port to listen on
///     #[env(default = 8080)]
///     port: u16,
/// }
///
/// let mut out = Vec::new();
/// let format = Format::Template("{key}={default} ({type})\n".to_string());
/// let opts = Options::new().with_prefix("app");
/// usage_to(&mut Config::default(), &opts, &mut out, &format).unwrap();
///
/// assert_eq!(String::from_utf8(out).unwrap(), "APP_PORT=8080 (Unsigned Integer)\n");
/// ```
///
/// # Errors
///
/// [`EnvError::Template`] for a malformed template, [`EnvError::Io`] when writing fails.
pub fn usage_to<S, W>(
    spec: &mut S,
    opts: &Options,
    out: &mut W,
    format: &Format,
) -> Result<(), EnvError>
where
    S: Specification + ?Sized,
    W: Write + ?Sized,
{
    let rows = entries(spec, opts)?;

    match format {
        Format::Table => write_table(&rows, out)?,
        Format::List => write_list(&rows, out)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
        Format::Template(source) => {
            let template = Template::parse(source)?;
            for row in &rows {
                template.render(row, out)?;
            }
        }
    }

    Ok(())
}

fn write_table<W: Write + ?Sized>(rows: &[UsageEntry], out: &mut W) -> io::Result<()> {
    const HEADINGS: [&str; 5] = ["KEY", "TYPE", "DEFAULT", "REQUIRED", "DESCRIPTION"];

    let cells: Vec<[&str; 5]> = std::iter::once(HEADINGS)
        .chain(rows.iter().map(|row| {
            [
                row.key.as_str(),
                row.type_description.as_str(),
                row.default_text(),
                row.required_text(),
                row.description.as_str(),
            ]
        }))
        .collect();

    let mut widths = [0usize; 4];
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    writeln!(out, "{USAGE_HEADER}")?;
    for line in &cells {
        for (cell, width) in line.iter().zip(widths) {
            write!(out, "{cell:<pad$}", pad = width + COLUMN_PADDING)?;
        }
        writeln!(out, "{}", line[4])?;
    }

    Ok(())
}

fn write_list<W: Write + ?Sized>(rows: &[UsageEntry], out: &mut W) -> io::Result<()> {
    write!(out, "{USAGE_HEADER}")?;
    for row in rows {
        write!(
            out,
            "\n{}\n  [description] {}\n  [type]        {}\n  [default]     {}\n  [required]    {}",
            row.key,
            row.description,
            row.type_description,
            row.default_text(),
            row.required_text(),
        )?;
    }
    writeln!(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Key,
    Type,
    Default,
    Required,
    Description,
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "key" => Some(Self::Key),
            "type" => Some(Self::Type),
            "default" => Some(Self::Default),
            "required" => Some(Self::Required),
            "description" => Some(Self::Description),
            _ => None,
        }
    }

    fn value(self, row: &UsageEntry) -> &str {
        match self {
            Self::Key => &row.key,
            Self::Type => &row.type_description,
            Self::Default => row.default_text(),
            Self::Required => row.required_text(),
            Self::Description => &row.description,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Piece {
    Text(String),
    Field(Placeholder),
}

#[derive(Debug)]
struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    fn parse(source: &str) -> Result<Self, EnvError> {
        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' if chars.next_if(|&(_, next)| next == '{').is_some() => text.push('{'),
                '}' if chars.next_if(|&(_, next)| next == '}').is_some() => text.push('}'),
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, ch)) => name.push(ch),
                            None => {
                                return Err(EnvError::template(format!(
                                    "unclosed placeholder at offset {offset}"
                                )))
                            }
                        }
                    }

                    let field = Placeholder::from_name(name.trim()).ok_or_else(|| {
                        EnvError::template(format!(
                            "unknown placeholder {{{name}}} at offset {offset}"
                        ))
                    })?;
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Field(field));
                }
                '}' => {
                    return Err(EnvError::template(format!(
                        "unmatched '}}' at offset {offset}"
                    )))
                }
                _ => text.push(c),
            }
        }

        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }
        Ok(Self { pieces })
    }

    fn render<W: Write + ?Sized>(&self, row: &UsageEntry, out: &mut W) -> io::Result<()> {
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.write_all(text.as_bytes())?,
                Piece::Field(field) => out.write_all(field.value(row).as_bytes())?,
            }
        }
        Ok(())
    }
}
