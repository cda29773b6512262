use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `{id, name}` sub-document used for genres and persons inside a film.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Actor,
    Writer,
    Director,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Actor, Role::Writer, Role::Director];

    /// Name of the nested list holding this role on a film document.
    pub fn group(self) -> &'static str {
        match self {
            Role::Actor => "actors",
            Role::Writer => "writers",
            Role::Director => "directors",
        }
    }
}

/// A film as stored in the `movies` index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilmDocument {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    #[serde(default)]
    pub genre: Vec<NamedRef>,
    #[serde(default)]
    pub actors: Vec<NamedRef>,
    #[serde(default)]
    pub writers: Vec<NamedRef>,
    #[serde(default)]
    pub directors: Vec<NamedRef>,
}

impl FilmDocument {
    pub fn persons_in(&self, role: Role) -> &[NamedRef] {
        match role {
            Role::Actor => &self.actors,
            Role::Writer => &self.writers,
            Role::Director => &self.directors,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenreDocument {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Identity record from the `persons` index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonDocument {
    pub id: Uuid,
    pub name: String,
}

/// Roles and films of a person, collected from every film that lists them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonAssociations {
    pub role: BTreeSet<Role>,
    pub film_ids: BTreeSet<Uuid>,
}

impl PersonAssociations {
    pub fn record(&mut self, role: Role, film_id: Uuid) {
        self.role.insert(role);
        self.film_ids.insert(film_id);
    }

    /// Union with another set of associations; nothing already present is lost.
    pub fn absorb(&mut self, other: PersonAssociations) {
        self.role.extend(other.role);
        self.film_ids.extend(other.film_ids);
    }

    /// Scans one film document for `person_id` in each role group.
    pub fn scan(&mut self, person_id: Uuid, film: &FilmDocument) {
        for role in Role::ALL {
            if film.persons_in(role).iter().any(|p| p.id == person_id) {
                self.record(role, film.id);
            }
        }
    }
}

// API projections

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub imdb_rating: Option<f64>,
    pub genre: Vec<NamedRef>,
    pub director: Vec<String>,
    pub actors_names: Vec<String>,
    pub writers_names: Vec<String>,
    pub actors: Vec<NamedRef>,
    pub writers: Vec<NamedRef>,
    pub directors: Vec<NamedRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilmShort {
    pub id: Uuid,
    pub title: String,
    pub imdb_rating: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenreSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenreDetail {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Identity merged with associations; also the shape cached under `person_<id>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub full_name: String,
    pub role: Vec<Role>,
    pub film_ids: Vec<Uuid>,
}

impl Person {
    pub fn associations(&self) -> PersonAssociations {
        PersonAssociations {
            role: self.role.iter().copied().collect(),
            film_ids: self.film_ids.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film_with(id: Uuid, writers: Vec<NamedRef>, directors: Vec<NamedRef>) -> FilmDocument {
        FilmDocument {
            id,
            title: "Star wars".into(),
            description: None,
            imdb_rating: Some(8.4),
            genre: vec![],
            actors: vec![],
            writers,
            directors,
        }
    }

    #[test]
    fn roles_serialize_singular() {
        let names: Vec<_> = Role::ALL.iter().map(|r| serde_json::to_value(r).unwrap()).collect();
        assert_eq!(names, ["actor", "writer", "director"]);
        assert_eq!(Role::Writer.group(), "writers");
    }

    #[test]
    fn associations_accumulate_across_films() {
        let person = NamedRef { id: Uuid::new_v4(), name: "George Lucas".into() };
        let film_a = film_with(Uuid::new_v4(), vec![person.clone()], vec![]);
        let film_b = film_with(Uuid::new_v4(), vec![], vec![person.clone()]);

        let mut assoc = PersonAssociations::default();
        assoc.scan(person.id, &film_a);
        assoc.scan(person.id, &film_b);

        assert_eq!(assoc.role, BTreeSet::from([Role::Writer, Role::Director]));
        assert_eq!(assoc.film_ids, BTreeSet::from([film_a.id, film_b.id]));
    }

    #[test]
    fn absorb_is_a_union() {
        let a_id = Uuid::new_v4();
        let b_id = Uuid::new_v4();
        let mut first = PersonAssociations::default();
        first.record(Role::Writer, a_id);
        let mut second = PersonAssociations::default();
        second.record(Role::Director, b_id);
        second.record(Role::Writer, a_id);

        first.absorb(second);

        assert_eq!(first.role.len(), 2);
        assert_eq!(first.film_ids, BTreeSet::from([a_id, b_id]));
    }

    #[test]
    fn film_document_tolerates_missing_lists() {
        let id = Uuid::new_v4();
        let raw = serde_json::json!({ "id": id, "title": "Star wars", "imdb_rating": 2.0 });
        let doc: FilmDocument = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.id, id);
        assert!(doc.genre.is_empty());
        assert!(doc.actors.is_empty());
        assert_eq!(doc.description, None);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&vec![Role::Actor, Role::Director]).unwrap();
        assert_eq!(json, r#"["actor","director"]"#);
    }
}
