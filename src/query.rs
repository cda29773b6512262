use serde_json::{Value, json};
use uuid::Uuid;

use crate::{models::Role, pagination::Page};

pub const DEFAULT_SORT: &str = "-imdb_rating";

const SORTABLE_FIELDS: &[&str] = &["imdb_rating"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Sort {
    pub field: &'static str,
    pub direction: SortDirection,
}

impl Sort {
    /// `-field` sorts descending, `+field` ascending. Anything else, including
    /// unknown fields, is the default: descending by rating.
    pub fn parse(token: Option<&str>) -> Self {
        let Some(token) = token else {
            return Self::default();
        };
        let (direction, field) = match token.split_at_checked(1) {
            Some(("-", field)) => (SortDirection::Desc, field),
            Some(("+", field)) => (SortDirection::Asc, field),
            _ => return Self::default(),
        };
        match SORTABLE_FIELDS.iter().find(|f| **f == field) {
            Some(field) => Self { field, direction },
            None => Self::default(),
        }
    }

    /// Canonical token, used when deriving cache keys.
    pub fn token(self) -> String {
        let sign = match self.direction {
            SortDirection::Asc => '+',
            SortDirection::Desc => '-',
        };
        format!("{sign}{}", self.field)
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self { field: "imdb_rating", direction: SortDirection::Desc }
    }
}

/// Normalized film search request.
#[derive(Clone, Debug, PartialEq)]
pub struct FilmQuery {
    pub text: Option<String>,
    pub genre: Option<String>,
    pub sort: Sort,
    pub page: Page,
}

impl FilmQuery {
    /// Blank strings count as absent.
    pub fn new(text: Option<&str>, genre: Option<&str>, sort: Option<&str>, page: Page) -> Self {
        Self {
            text: non_blank(text),
            genre: non_blank(genre),
            sort: Sort::parse(sort.map(str::trim)),
            page,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn fuzzy(field: &str, value: &str) -> Value {
    json!({ "fuzzy": { field: { "value": value, "fuzziness": "AUTO" } } })
}

fn nested_term(path: &str, id: &str) -> Value {
    json!({
        "nested": {
            "path": path,
            "query": { "term": { format!("{path}.id"): id } }
        }
    })
}

pub fn film_search(query: &FilmQuery) -> Value {
    let mut body = json!({
        "from": query.page.offset(),
        "size": query.page.limit(),
        "sort": [{ query.sort.field: { "order": query.sort.direction.as_str() } }],
    });

    let mut clauses = serde_json::Map::new();
    if let Some(genre) = &query.genre {
        clauses.insert("filter".into(), nested_term("genre", genre));
    }
    if let Some(text) = &query.text {
        clauses.insert("must".into(), fuzzy("title", text));
    }
    if !clauses.is_empty() {
        body["query"] = json!({ "bool": clauses });
    }
    body
}

pub fn person_name_search(text: &str, page: Page) -> Value {
    json!({
        "from": page.offset(),
        "size": page.limit(),
        "query": fuzzy("name", text),
    })
}

/// Films where `person_id` appears in any role group.
pub fn films_by_person(person_id: Uuid, from: u64, size: u64) -> Value {
    let id = person_id.to_string();
    let should: Vec<Value> = Role::ALL.iter().map(|r| nested_term(r.group(), &id)).collect();
    json!({
        "from": from,
        "size": size,
        "query": { "bool": { "should": should, "minimum_should_match": 1 } },
    })
}

pub fn match_all(page: Page) -> Value {
    json!({
        "from": page.offset(),
        "size": page.limit(),
        "query": { "match_all": {} },
    })
}
