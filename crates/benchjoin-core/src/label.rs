//! Configuration labels for summary rows.
//!
//! A label template is plain text with `{Column}` placeholders, e.g.
//! `MPI: N {Nodes}, Prc {Processes}`. Use `{{` and `}}` for literal braces.
//! The rendered label becomes the first column of the summary table.

use crate::error::{JoinError, Result};
use crate::table::{Cell, Table};

/// Name of the label column in every summary table.
pub const LABEL_COLUMN: &str = "Label";

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// Parsed label template.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTemplate {
    segments: Vec<Segment>,
}

impl LabelTemplate {
    /// Parse a template string.
    ///
    /// # Examples
    ///
    /// ```
    /// use benchjoin_core::label::LabelTemplate;
    ///
    /// let template = LabelTemplate::parse("MPI: N {Nodes}, Prc {Processes}").unwrap();
    /// assert_eq!(template.fields().collect::<Vec<_>>(), vec!["Nodes", "Processes"]);
    /// assert!(LabelTemplate::parse("N {Nodes").is_err());
    /// ```
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut field = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        field.push(c);
                    }
                    if !closed || field.trim().is_empty() || field.contains('{') {
                        return Err(JoinError::Config(format!(
                            "malformed placeholder in label template '{}'",
                            template
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field.trim().to_string()));
                }
                '}' => {
                    return Err(JoinError::Config(format!(
                        "unmatched '}}' in label template '{}'",
                        template
                    )))
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Column names referenced by the template, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Resolve every placeholder against `columns`.
    ///
    /// Fails with a configuration error if a placeholder names a column that
    /// is not present.
    pub fn bind<'a>(&'a self, columns: &[String]) -> Result<BoundLabel<'a>> {
        let pieces = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => Ok(Piece::Literal(text.as_str())),
                Segment::Field(name) => columns
                    .iter()
                    .position(|column| column == name)
                    .map(Piece::Column)
                    .ok_or_else(|| {
                        JoinError::Config(format!("label references unknown column '{}'", name))
                    }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(BoundLabel { pieces })
    }
}

#[derive(Debug, Clone, Copy)]
enum Piece<'a> {
    Literal(&'a str),
    Column(usize),
}

/// Label template with placeholders resolved to column positions.
#[derive(Debug, Clone)]
pub struct BoundLabel<'a> {
    pieces: Vec<Piece<'a>>,
}

impl BoundLabel<'_> {
    /// Render the label for one row of the table the template was bound to.
    pub fn render(&self, row: &[Cell]) -> String {
        let mut label = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => label.push_str(text),
                Piece::Column(index) => label.push_str(&row[*index].to_string()),
            }
        }
        label
    }
}

/// Prepend a label column rendered from each row.
///
/// Any existing label column is replaced; the other columns keep their
/// relative order.
pub fn apply_labels(table: &Table, template: &LabelTemplate) -> Result<Table> {
    let bound = template.bind(table.columns())?;

    let kept: Vec<usize> = (0..table.columns().len())
        .filter(|&index| table.columns()[index] != LABEL_COLUMN)
        .collect();

    let columns = std::iter::once(LABEL_COLUMN.to_string())
        .chain(kept.iter().map(|&index| table.columns()[index].clone()))
        .collect();
    let mut labeled = Table::new(columns);

    for row in table.rows() {
        let mut output = Vec::with_capacity(kept.len() + 1);
        output.push(Cell::Text(bound.render(row)));
        output.extend(kept.iter().map(|&index| row[index].clone()));
        labeled.push_row(output);
    }

    Ok(labeled)
}
