/// Parser for plain-text task files of the form
/// "title1 key1: value1, value2 key2: value3 title2 key3: value4".
/// A document is a map title -> (key -> list of values). Titles and keys are word
/// characters; values are separated by commas. Lines starting with //, #, % or ;
/// are comments.
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;

pub type SectionMap = HashMap<String, Vec<Value>>;
pub type DocumentMap = HashMap<String, SectionMap>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    /// integers are accepted where a float is expected ("a: 1" means 1.0)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self { Some(*i) } else { None }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self { Some(*b) } else { None }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

fn identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    map(parser, String::from).parse(input)
}

fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, title) = identifier(input)?;
    Ok((input.trim(), title))
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    let token = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\r' | '\n' | ';'));
    let mut parser = map(token, |s: &str| {
        let s = s.trim();
        if let Ok(val) = s.parse::<i64>() {
            Value::Integer(val)
        } else if let Ok(val) = s.parse::<f64>() {
            Value::Float(val)
        } else if let Ok(val) = s.parse::<bool>() {
            Value::Boolean(val)
        } else {
            Value::String(s.to_string())
        }
    });
    parser.parse(input)
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let (input, _) = space0(input)?;
    let comma = delimited(space0, tag(","), space0);
    separated_list0(comma, parse_value).parse(input)
}

fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon = delimited(space0, tag(":"), space0);
    let (input, pair) = separated_pair(identifier, colon, parse_value_list).parse(input)?;
    Ok((input.trim_start(), pair))
}

fn parse_section(input: &str) -> IResult<&str, (String, HashMap<String, Vec<Value>>)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    let (input, pairs) = many1(terminated(parse_key_value_pair, space0)).parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !(trimmed.is_empty()
                || trimmed.starts_with("//")
                || trimmed.starts_with('#')
                || trimmed.starts_with('%')
                || trimmed.starts_with(';'))
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

fn parse_sections(input: &str) -> IResult<&str, DocumentMap> {
    let (input, _) = multispace0(input)?;
    let (input, sections) = many1(delimited(space0, parse_section, multispace0)).parse(input)?;
    Ok((input, sections.into_iter().collect()))
}

/// parse a whole document; comments are dropped and nothing may be left over
pub fn parse_document(input: &str) -> Result<DocumentMap, String> {
    let cleaned = filter_comments(input);
    let (remaining, document) =
        parse_sections(&cleaned).map_err(|e| format!("Parsing error: {:?}", e))?;
    if !remaining.trim().is_empty() {
        return Err(format!(
            "Failed to parse entire document. Remaining: '{}'",
            remaining
        ));
    }
    Ok(document)
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<DocumentMap, String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read task file {}: {}", path.display(), e))?;
    parse_document(&content)
}

/// Read access to a parsed document that tolerates alternative spellings of
/// section titles and keys (pseudonyms), so "subdivisions: 8" works as well as "n: 8".
pub struct DocumentReader<'a> {
    document: &'a DocumentMap,
}

impl<'a> DocumentReader<'a> {
    pub fn new(document: &'a DocumentMap) -> Self {
        DocumentReader { document }
    }

    /// Fails on the first section title or key not listed in `known`, a list of
    /// (section pseudonyms, accepted keys) pairs. Comparison ignores case.
    pub fn reject_unknown(&self, known: &[(&[&str], &[&str])]) -> Result<(), String> {
        for (title, section) in self.document {
            let Some((_, keys)) = known
                .iter()
                .find(|(titles, _)| titles.iter().any(|t| t.eq_ignore_ascii_case(title)))
            else {
                return Err(format!("unknown section '{}'", title));
            };
            if let Some(key) = section
                .keys()
                .find(|key| !keys.iter().any(|k| k.eq_ignore_ascii_case(key)))
            {
                return Err(format!("unknown key '{}' in section '{}'", key, title));
            }
        }
        Ok(())
    }

    fn section(&self, titles: &[&str]) -> Option<&'a SectionMap> {
        titles.iter().find_map(|t| {
            self.document
                .iter()
                .find(|(title, _)| title.eq_ignore_ascii_case(t))
                .map(|(_, section)| section)
        })
    }

    /// first value stored under any of `keys` in any of `titles`
    pub fn value(&self, titles: &[&str], keys: &[&str]) -> Result<Option<&'a Value>, String> {
        let Some(section) = self.section(titles) else {
            return Ok(None);
        };
        let found = keys.iter().find_map(|k| {
            section
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(k))
                .map(|(_, values)| values)
        });
        match found.map(|values| values.as_slice()) {
            Some([single]) => Ok(Some(single)),
            Some([]) | None => Ok(None),
            Some(values) => Err(format!(
                "key '{}' expects a single value, got {}",
                keys[0],
                values.len()
            )),
        }
    }

    pub fn float(&self, titles: &[&str], keys: &[&str]) -> Result<Option<f64>, String> {
        self.typed(titles, keys, "a number", Value::as_float)
    }

    pub fn integer(&self, titles: &[&str], keys: &[&str]) -> Result<Option<i64>, String> {
        self.typed(titles, keys, "an integer", Value::as_integer)
    }

    pub fn boolean(&self, titles: &[&str], keys: &[&str]) -> Result<Option<bool>, String> {
        self.typed(titles, keys, "true or false", Value::as_boolean)
    }

    /// any value rendered as text; numbers are fine where a name is expected
    pub fn text(&self, titles: &[&str], keys: &[&str]) -> Result<Option<String>, String> {
        Ok(self.value(titles, keys)?.map(|v| v.to_string()))
    }

    fn typed<T>(
        &self,
        titles: &[&str],
        keys: &[&str],
        expected: &str,
        convert: fn(&Value) -> Option<T>,
    ) -> Result<Option<T>, String> {
        match self.value(titles, keys)? {
            None => Ok(None),
            Some(v) => convert(v)
                .map(Some)
                .ok_or_else(|| format!("key '{}' must be {}, got '{}'", keys[0], expected, v)),
        }
    }
}
