//! Filename generation templates.
//!
//! Parses templates like `SWOT_{level!f}_{cycle_number:>03d}_{time!f}.nc`
//! and renders them from field values.
//!
//! Placeholders take the forms:
//! - `{name}` - the value's plain text
//! - `{name!f}` - the text produced by the field's own encoder
//! - `{name:spec}` / `{name!f:spec}` - either of the above, formatted with
//!   `[[fill]align][sign][0][width][.precision][type]` where `align` is one of
//!   `<`, `>`, `^`, `=` and `type` one of `d`, `f`, `s`
//!
//! `{{` and `}}` produce literal braces.

use gf_error::{GfError, Result};
use gf_types::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::field::FilenameField;

/// A segment of a generation template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A `{...}` replacement field.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
    name: String,
    /// `!f` conversion: render with the field's encoder
    delegate: bool,
    spec: FormatSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Plus,
    Minus,
    Space,
}

/// The format specification following `:` in a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FormatSpec {
    fill: Option<char>,
    align: Option<Align>,
    sign: Option<Sign>,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Option<char>,
}

impl FormatSpec {
    fn parse(spec: &str, template: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            GfError::Config(format!(
                "Invalid format specification '{spec}' in template '{template}': {reason}"
            ))
        };

        let chars: Vec<char> = spec.chars().collect();
        let mut parsed = FormatSpec::default();
        let mut pos = 0;

        if let Some(align) = chars.get(1).and_then(|c| Align::from_char(*c)) {
            parsed.fill = Some(chars[0]);
            parsed.align = Some(align);
            pos = 2;
        } else if let Some(align) = chars.first().and_then(|c| Align::from_char(*c)) {
            parsed.align = Some(align);
            pos = 1;
        }

        parsed.sign = match chars.get(pos) {
            Some('+') => Some(Sign::Plus),
            Some('-') => Some(Sign::Minus),
            Some(' ') => Some(Sign::Space),
            _ => None,
        };
        if parsed.sign.is_some() {
            pos += 1;
        }

        if chars.get(pos) == Some(&'0') {
            parsed.zero = true;
            pos += 1;
        }

        let width_start = pos;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos > width_start {
            let width: String = chars[width_start..pos].iter().collect();
            parsed.width = width.parse().map_err(|_| invalid("width is too large"))?;
        }

        if chars.get(pos) == Some(&'.') {
            pos += 1;
            let precision_start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos == precision_start {
                return Err(invalid("missing precision after '.'"));
            }
            let precision: String = chars[precision_start..pos].iter().collect();
            parsed.precision =
                Some(precision.parse().map_err(|_| invalid("precision is too large"))?);
        }

        if let Some(kind) = chars.get(pos) {
            if !matches!(kind, 'd' | 'f' | 's') {
                return Err(invalid(&format!("unsupported type '{kind}'")));
            }
            parsed.kind = Some(*kind);
            pos += 1;
        }

        if pos != chars.len() {
            return Err(invalid("unexpected trailing characters"));
        }
        Ok(parsed)
    }

    fn format_text(&self, name: &str, text: String) -> Result<String> {
        if matches!(self.kind, Some('d') | Some('f')) {
            return Err(GfError::Generation(format!(
                "Unknown format code '{}' for the text of '{name}'",
                self.kind.unwrap_or_default()
            )));
        }
        let text = match self.precision {
            Some(precision) => text.chars().take(precision).collect(),
            None => text,
        };
        Ok(self.pad(text, false))
    }

    fn format_value(&self, name: &str, value: &Value) -> Result<String> {
        let mismatch = || {
            GfError::Generation(format!(
                "Unknown format code '{}' for {} value '{name}'",
                self.kind.unwrap_or_default(),
                value.type_name()
            ))
        };

        match value {
            Value::Int(i) => {
                let body = match self.kind {
                    None | Some('d') => i.to_string(),
                    Some('f') => format!("{:.*}", self.precision.unwrap_or(6), *i as f64),
                    _ => return Err(mismatch()),
                };
                Ok(self.pad(self.signed(body, *i >= 0), true))
            }
            Value::Float(f) => {
                let body = match (self.kind, self.precision) {
                    (Some('f'), precision) => format!("{:.*}", precision.unwrap_or(6), f),
                    (None, Some(precision)) => format!("{:.*}", precision, f),
                    (None, None) => format!("{f:?}"),
                    _ => return Err(mismatch()),
                };
                Ok(self.pad(self.signed(body, *f >= 0.0), true))
            }
            Value::Str(_) | Value::Enum(_) | Value::DateTime(_) | Value::Period(_) => {
                if matches!(self.kind, Some('d') | Some('f')) {
                    return Err(mismatch());
                }
                self.format_text(name, value.to_string())
            }
        }
    }

    fn signed(&self, body: String, non_negative: bool) -> String {
        match (self.sign, non_negative) {
            (Some(Sign::Plus), true) => format!("+{body}"),
            (Some(Sign::Space), true) => format!(" {body}"),
            _ => body,
        }
    }

    fn pad(&self, body: String, numeric: bool) -> String {
        let length = body.chars().count();
        if length >= self.width {
            return body;
        }

        let fill = self.fill.unwrap_or(if self.zero { '0' } else { ' ' });
        let align = self.align.unwrap_or(match (numeric, self.zero) {
            (true, true) => Align::AfterSign,
            (true, false) => Align::Right,
            (false, _) => Align::Left,
        });
        let padding = self.width - length;
        let repeat = |n: usize| std::iter::repeat(fill).take(n).collect::<String>();

        match align {
            Align::Left => body + &repeat(padding),
            Align::Right => repeat(padding) + &body,
            Align::Center => {
                let left = padding / 2;
                repeat(left) + &body + &repeat(padding - left)
            }
            Align::AfterSign => {
                let signed = numeric && body.starts_with(['+', '-', ' ']);
                if signed {
                    let (sign, digits) = body.split_at(1);
                    format!("{sign}{}{digits}", repeat(padding))
                } else {
                    repeat(padding) + &body
                }
            }
        }
    }
}

/// A parsed filename generation template.
///
/// # Example
///
/// ```
/// use gf_convention::GenerationTemplate;
///
/// let template = GenerationTemplate::parse("cycle_{cycle_number:>03d}").unwrap();
/// assert_eq!(template.field_names().into_iter().collect::<Vec<_>>(), vec!["cycle_number"]);
/// ```
#[derive(Debug, Clone)]
pub struct GenerationTemplate {
    segments: Vec<Segment>,
    source: String,
}

impl GenerationTemplate {
    /// Parse a template string.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Config`] if:
    /// - A placeholder is not closed (`{name`) or a `}` is unmatched
    /// - A placeholder is positional (`{}` or `{0}`) or its name is invalid
    /// - A conversion other than `!f` or `!s` is used
    /// - A format specification is malformed
    pub fn parse(template: &str) -> Result<Self> {
        let chars: Vec<char> = template.chars().collect();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut pos = 0;

        while pos < chars.len() {
            match chars[pos] {
                '{' if chars.get(pos + 1) == Some(&'{') => {
                    literal.push('{');
                    pos += 2;
                }
                '}' if chars.get(pos + 1) == Some(&'}') => {
                    literal.push('}');
                    pos += 2;
                }
                '{' => {
                    let start = pos + 1;
                    let mut end = start;
                    while end < chars.len() && chars[end] != '}' {
                        if chars[end] == '{' {
                            return Err(GfError::Config(format!(
                                "Nested placeholders are not supported in template: {template}"
                            )));
                        }
                        end += 1;
                    }
                    if end >= chars.len() {
                        return Err(GfError::Config(format!(
                            "Unclosed placeholder in template: {template}"
                        )));
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let content: String = chars[start..end].iter().collect();
                    segments.push(Segment::Placeholder(parse_placeholder(&content, template)?));
                    pos = end + 1;
                }
                '}' => {
                    return Err(GfError::Config(format!(
                        "Single '}}' encountered in template: {template}"
                    )));
                }
                c => {
                    literal.push(c);
                    pos += 1;
                }
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            segments,
            source: template.to_string(),
        })
    }

    /// Names of the values referenced by the template.
    pub fn field_names(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(placeholder) => Some(placeholder.name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Names of the values rendered through their field encoder (`!f`).
    pub fn delegated_names(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(p) if p.delegate => Some(p.name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The template source text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render the template.
    ///
    /// `fields` provides the encoders for `!f` placeholders. Extra values are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Generation`] when a referenced value is missing or
    /// cannot be formatted.
    pub fn render(
        &self,
        values: &HashMap<String, Value>,
        fields: &[Arc<dyn FilenameField>],
    ) -> Result<String> {
        let mut output = String::new();

        for segment in &self.segments {
            let placeholder = match segment {
                Segment::Literal(text) => {
                    output.push_str(text);
                    continue;
                }
                Segment::Placeholder(placeholder) => placeholder,
            };

            let name = placeholder.name.as_str();
            let value = values.get(name).ok_or_else(|| {
                GfError::Generation(format!(
                    "Missing argument '{name}' to generate from template '{}'",
                    self.source
                ))
            })?;

            let rendered = if placeholder.delegate {
                let field = fields.iter().find(|f| f.name() == name).ok_or_else(|| {
                    GfError::Generation(format!(
                        "No field '{name}' to encode placeholder '{{{name}!f}}'"
                    ))
                })?;
                placeholder.spec.format_text(name, field.encode(value)?)?
            } else {
                placeholder.spec.format_value(name, value)?
            };
            output.push_str(&rendered);
        }

        Ok(output)
    }
}

fn parse_placeholder(content: &str, template: &str) -> Result<Placeholder> {
    let (head, spec) = match content.split_once(':') {
        Some((head, spec)) => (head, spec),
        None => (content, ""),
    };
    let (name, conversion) = match head.split_once('!') {
        Some((name, conversion)) => (name, Some(conversion)),
        None => (head, None),
    };

    if name.is_empty() || name.chars().all(|c| c.is_ascii_digit()) {
        return Err(GfError::Config(format!(
            "Positional placeholders are not supported, name every placeholder in template: {template}"
        )));
    }
    if !is_valid_name(name) {
        return Err(GfError::Config(format!(
            "Invalid placeholder name '{name}' in template: {template}"
        )));
    }

    let delegate = match conversion {
        None | Some("s") => false,
        Some("f") => true,
        Some(other) => {
            return Err(GfError::Config(format!(
                "Unsupported conversion '!{other}' in template: {template}"
            )));
        }
    };

    Ok(Placeholder {
        name: name.to_string(),
        delegate,
        spec: FormatSpec::parse(spec, template)?,
    })
}

/// Placeholder names contain alphanumerics and underscores only.
fn is_valid_name(name: &str) -> bool {
    name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
