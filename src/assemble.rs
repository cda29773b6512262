use uuid::Uuid;

use crate::models::{
    Film, FilmDocument, FilmShort, GenreDetail, GenreDocument, GenreSummary, NamedRef, Person,
    PersonAssociations, PersonDocument, Role,
};

/// A person credited on a film, flattened out of the role groups.
#[derive(Clone, Debug, PartialEq)]
pub struct Credit {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
}

pub fn credits(doc: &FilmDocument) -> Vec<Credit> {
    Role::ALL
        .into_iter()
        .flat_map(|role| {
            doc.persons_in(role).iter().map(move |p| Credit {
                id: p.id,
                full_name: p.name.clone(),
                role,
            })
        })
        .collect()
}

pub fn film(doc: &FilmDocument) -> Film {
    let mut out = Film {
        id: doc.id,
        title: doc.title.clone(),
        description: doc.description.clone(),
        imdb_rating: doc.imdb_rating,
        genre: doc.genre.iter().map(|g| NamedRef { id: g.id, name: g.name.clone() }).collect(),
        director: Vec::new(),
        actors_names: Vec::new(),
        writers_names: Vec::new(),
        actors: Vec::new(),
        writers: Vec::new(),
        directors: Vec::new(),
    };

    // one pass fills both shapes, so they cannot drift apart
    for credit in credits(doc) {
        let (bucket, names) = match credit.role {
            Role::Actor => (&mut out.actors, &mut out.actors_names),
            Role::Writer => (&mut out.writers, &mut out.writers_names),
            Role::Director => (&mut out.directors, &mut out.director),
        };
        names.push(credit.full_name.clone());
        bucket.push(NamedRef { id: credit.id, name: credit.full_name });
    }

    out
}

pub fn film_short(doc: &FilmDocument) -> FilmShort {
    FilmShort { id: doc.id, title: doc.title.clone(), imdb_rating: doc.imdb_rating }
}

pub fn genre_summary(doc: &GenreDocument) -> GenreSummary {
    GenreSummary { id: doc.id, name: doc.name.clone() }
}

pub fn genre_detail(doc: &GenreDocument) -> GenreDetail {
    GenreDetail { id: doc.id, name: doc.name.clone(), description: doc.description.clone() }
}

/// Identity and associations have disjoint fields; the merge takes identity
/// fields only from `identity` and association fields only from `associations`.
pub fn person(identity: PersonDocument, associations: PersonAssociations) -> Person {
    Person {
        id: identity.id,
        full_name: identity.name,
        role: associations.role.into_iter().collect(),
        film_ids: associations.film_ids.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn named(name: &str) -> NamedRef {
        NamedRef { id: Uuid::new_v4(), name: name.to_string() }
    }

    fn sample() -> FilmDocument {
        FilmDocument {
            id: Uuid::new_v4(),
            title: "The Star".into(),
            description: Some("New World".into()),
            imdb_rating: Some(8.5),
            genre: vec![named("Comedy"), named("Fantasy")],
            actors: vec![named("Ann"), named("Bob")],
            writers: vec![named("Ben"), named("Howard")],
            directors: vec![named("Stan")],
        }
    }

    #[test]
    fn credits_cover_every_role() {
        let doc = sample();
        let credits = credits(&doc);
        assert_eq!(credits.len(), 5);
        assert_eq!(credits.iter().filter(|c| c.role == Role::Writer).count(), 2);
        assert_eq!(credits.last().map(|c| c.role), Some(Role::Director));
    }

    #[test]
    fn film_partitions_and_name_lists_agree() {
        let doc = sample();
        let film = film(&doc);

        let names = |refs: &[NamedRef]| refs.iter().map(|p| p.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&film.actors), film.actors_names);
        assert_eq!(names(&film.writers), film.writers_names);
        assert_eq!(names(&film.directors), film.director);
        assert_eq!(film.actors, doc.actors);
        assert_eq!(film.director, vec!["Stan".to_string()]);
    }

    #[test]
    fn film_keeps_genre_order() {
        let doc = sample();
        let film = film(&doc);
        let genres: Vec<_> = film.genre.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(genres, ["Comedy", "Fantasy"]);
    }

    #[test]
    fn genre_projections() {
        let doc = GenreDocument {
            id: Uuid::new_v4(),
            name: "Drama".into(),
            description: Some("d".into()),
        };
        let summary = serde_json::to_value(genre_summary(&doc)).unwrap();
        assert!(summary.get("description").is_none());
        assert_eq!(genre_detail(&doc).description.as_deref(), Some("d"));
    }

    #[test]
    fn person_merge_combines_both_halves() {
        let identity = PersonDocument { id: Uuid::new_v4(), name: "George Lucas".into() };
        let film_id = Uuid::new_v4();
        let associations = PersonAssociations {
            role: BTreeSet::from([Role::Director, Role::Writer]),
            film_ids: BTreeSet::from([film_id]),
        };

        let person = person(identity.clone(), associations);

        assert_eq!(person.id, identity.id);
        assert_eq!(person.full_name, "George Lucas");
        assert_eq!(person.role, vec![Role::Writer, Role::Director]);
        assert_eq!(person.film_ids, vec![film_id]);
    }
}
