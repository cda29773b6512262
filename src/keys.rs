use uuid::Uuid;

use crate::{pagination::Page, query::FilmQuery};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Film,
    Genre,
    Person,
}

impl Kind {
    fn prefix(self) -> &'static str {
        match self {
            Kind::Film => "film",
            Kind::Genre => "genre",
            Kind::Person => "person",
        }
    }
}

pub fn object_key(kind: Kind, id: Uuid) -> String {
    format!("{}_{id}", kind.prefix())
}

fn compose(namespace: &str, pairs: &[(&str, Option<String>)]) -> String {
    let mut key = String::from(namespace);
    key.push('?');
    for (i, (field, value)) in pairs.iter().enumerate() {
        if i > 0 {
            key.push('&');
        }
        key.push_str(field);
        key.push('=');
        if let Some(value) = value {
            key.push_str(&urlencoding::encode(value));
        }
    }
    key
}

fn page_pairs(page: Page) -> [(&'static str, Option<String>); 2] {
    [("page[number]", Some(page.number.to_string())), ("page[size]", Some(page.size.to_string()))]
}

pub fn films_key(query: &FilmQuery) -> String {
    let [number, size] = page_pairs(query.page);
    compose(
        "films",
        &[
            number,
            size,
            ("filter[genre]", query.genre.clone()),
            ("query", query.text.clone()),
            ("sort", Some(query.sort.token())),
        ],
    )
}

pub fn genres_key(page: Page) -> String {
    compose("genres", &page_pairs(page))
}

pub fn person_search_key(text: &str, page: Page) -> String {
    let [number, size] = page_pairs(page);
    compose("persons", &[("query", Some(text.to_string())), number, size])
}

pub fn person_films_key(person_id: Uuid, page: Page) -> String {
    let [number, size] = page_pairs(page);
    compose("person_films", &[("person", Some(person_id.to_string())), number, size])
}
