use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Number of selectable terms: two before the current one, the current one, two after.
pub const WINDOW_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Season {
    #[serde(alias = "winter", alias = "Winter")]
    Winter,
    #[serde(alias = "summer", alias = "Summer")]
    Summer,
    #[serde(alias = "fall", alias = "Fall")]
    Fall,
}

impl Season {
    pub const fn ordered() -> [Self; 3] {
        [Self::Winter, Self::Summer, Self::Fall]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Winter => "WINTER",
            Self::Summer => "SUMMER",
            Self::Fall => "FALL",
        }
    }

    /// Months 1-5 are winter, 6-8 summer, 9-12 fall.
    pub const fn for_month(month: u32) -> Self {
        match month {
            1..=5 => Self::Winter,
            6..=8 => Self::Summer,
            _ => Self::Fall,
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Winter => 0,
            Self::Summer => 1,
            Self::Fall => 2,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Season {
    type Err = TermParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Season::ordered()
            .into_iter()
            .find(|season| season.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| TermParseError::UnknownSeason(value.trim().to_string()))
    }
}

/// An academic period. Value object: two terms are the same term iff season and year match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub season: Season,
    pub year: i32,
}

impl Term {
    pub const fn new(season: Season, year: i32) -> Self {
        Self { season, year }
    }

    pub fn current(now: NaiveDate) -> Self {
        Self::new(Season::for_month(now.month()), now.year())
    }

    pub const fn next(self) -> Self {
        match self.season {
            Season::Winter => Self::new(Season::Summer, self.year),
            Season::Summer => Self::new(Season::Fall, self.year),
            Season::Fall => Self::new(Season::Winter, self.year + 1),
        }
    }

    pub const fn previous(self) -> Self {
        match self.season {
            Season::Winter => Self::new(Season::Fall, self.year - 1),
            Season::Summer => Self::new(Season::Winter, self.year),
            Season::Fall => Self::new(Season::Summer, self.year),
        }
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| self.season.rank().cmp(&other.season.rank()))
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}

/// Parses `"SEASON YEAR"`; the season token is case-insensitive and any run of whitespace
/// separates the two tokens.
impl FromStr for Term {
    type Err = TermParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut tokens = value.split_whitespace();
        let season = tokens.next().ok_or(TermParseError::Empty)?;
        let year = tokens
            .next()
            .ok_or_else(|| TermParseError::MissingYear(value.trim().to_string()))?;
        if let Some(extra) = tokens.next() {
            return Err(TermParseError::UnexpectedToken(extra.to_string()));
        }

        let season = season.parse::<Season>()?;
        let year = year
            .parse::<i32>()
            .map_err(|_| TermParseError::InvalidYear(year.to_string()))?;

        Ok(Self::new(season, year))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TermParseError {
    #[error("term value is empty")]
    Empty,
    #[error("unknown season '{0}'")]
    UnknownSeason(String),
    #[error("term '{0}' has no year")]
    MissingYear(String),
    #[error("'{0}' is not a valid year")]
    InvalidYear(String),
    #[error("unexpected token '{0}' after the year")]
    UnexpectedToken(String),
}

/// Term as it appears on a record: either structured or a freeform `"SEASON YEAR"` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermValue {
    Structured(Term),
    Raw(String),
}

impl TermValue {
    /// Resolves the value to a term, or `None` when it cannot be parsed.
    pub fn resolve(&self) -> Option<Term> {
        match self {
            TermValue::Structured(term) => Some(*term),
            TermValue::Raw(raw) => raw.parse().ok(),
        }
    }
}

impl From<Term> for TermValue {
    fn from(term: Term) -> Self {
        TermValue::Structured(term)
    }
}

pub fn current_term(now: NaiveDate) -> Term {
    Term::current(now)
}

pub const fn next_term(term: Term) -> Term {
    term.next()
}

pub const fn previous_term(term: Term) -> Term {
    term.previous()
}

/// The selectable terms around `now`, in chronological order, with the current term in the
/// middle.
pub fn window(now: NaiveDate) -> [Term; WINDOW_SIZE] {
    let current = Term::current(now);
    let before = current.previous();
    let after = current.next();
    [before.previous(), before, current, after, after.next()]
}

/// Whether a record's term value designates `term`. Missing or unparsable values never match.
pub fn matches(term: Term, value: Option<&TermValue>) -> bool {
    value
        .and_then(TermValue::resolve)
        .is_some_and(|resolved| resolved == term)
}

/// Keeps the records whose term value matches `term`, preserving order.
pub fn filter_by_term<'a, T, F>(records: &'a [T], term: Term, accessor: F) -> Vec<&'a T>
where
    F: Fn(&T) -> Option<&TermValue>,
{
    records
        .iter()
        .filter(|record| matches(term, accessor(record)))
        .collect()
}
