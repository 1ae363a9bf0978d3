/// Compiles a field template such as
/// `<Month> <Date> <Time> <Level> <Component>(\[<PID>\])?: <Content>`
/// into an anchored regex with one named, non-greedy group per field.
///
/// Literal text between placeholders is copied into the pattern as-is, so
/// regex syntax in the template (escaped brackets, optional groups) keeps its
/// meaning. Only whitespace runs are rewritten, to `\s+`.
use crate::error::{MinerError, Result};
use crate::reporter::{EVENT_ID_COLUMN, LINE_ID_COLUMN};
use regex::Regex;
use std::sync::Arc;

/// Field names in template order, shared by every record parsed with them.
pub type FieldSchema = Arc<[String]>;

#[derive(Debug, Clone)]
pub struct LogFormat {
    template: String,
    fields: FieldSchema,
    regex: Regex,
}

impl LogFormat {
    /// Compile a template. Syntax errors are configuration errors and are
    /// reported before any input is read.
    pub fn compile(template: &str) -> Result<Self> {
        let (pattern, fields) = template_to_regex(template)?;

        let regex = Regex::new(&pattern).map_err(|source| MinerError::InvalidPattern {
            template: template.to_string(),
            source,
        })?;

        tracing::debug!("Compiled log format {:?} to {}", template, regex.as_str());

        Ok(Self {
            template: template.to_string(),
            fields: fields.into(),
            regex,
        })
    }

    /// The template exactly as the caller wrote it
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn fields(&self) -> &FieldSchema {
        &self.fields
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

/// Walk the template once, emitting separators and named groups.
fn template_to_regex(template: &str) -> Result<(String, Vec<String>)> {
    let mut pattern = String::from("^");
    let mut fields: Vec<String> = Vec::new();
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '<' => {
                let mut name = String::new();
                let mut closed = false;

                for (inner_pos, inner) in chars.by_ref() {
                    match inner {
                        '>' => {
                            closed = true;
                            break;
                        }
                        '<' => {
                            return Err(MinerError::invalid_format(
                                template,
                                format!("unexpected '<' at byte {inner_pos} inside the placeholder opened at byte {pos}"),
                            ));
                        }
                        _ => name.push(inner),
                    }
                }

                if !closed {
                    return Err(MinerError::invalid_format(
                        template,
                        format!("placeholder opened at byte {pos} is never closed"),
                    ));
                }
                validate_field_name(template, &name, pos)?;
                if name == LINE_ID_COLUMN || name == EVENT_ID_COLUMN {
                    return Err(MinerError::invalid_format(
                        template,
                        format!("field <{name}> is reserved for the cluster report"),
                    ));
                }
                if fields.contains(&name) {
                    return Err(MinerError::invalid_format(
                        template,
                        format!("field <{name}> appears more than once"),
                    ));
                }

                pattern.push_str(&format!("(?P<{name}>.*?)"));
                fields.push(name);
            }
            '>' => {
                return Err(MinerError::invalid_format(
                    template,
                    format!("'>' at byte {pos} has no matching '<'"),
                ));
            }
            c if c.is_whitespace() => {
                // Collapse the whole run
                while chars.next_if(|(_, next)| next.is_whitespace()).is_some() {}
                pattern.push_str(r"\s+");
            }
            c => pattern.push(c),
        }
    }

    if fields.is_empty() {
        return Err(MinerError::invalid_format(
            template,
            "template has no <Field> placeholders",
        ));
    }

    pattern.push('$');
    Ok((pattern, fields))
}

fn validate_field_name(template: &str, name: &str, pos: usize) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(MinerError::invalid_format(
            template,
            format!("placeholder at byte {pos} has invalid field name {name:?}"),
        ))
    }
}
