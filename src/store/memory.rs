use std::cmp::Ordering;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, StoreResult};
use crate::{
    models::{FilmDocument, GenreDocument, PersonAssociations, PersonDocument, Role},
    pagination::Page,
    query::{FilmQuery, SortDirection},
};

#[derive(Default)]
pub struct MemoryCatalog {
    films: RwLock<Vec<FilmDocument>>,
    genres: RwLock<Vec<GenreDocument>>,
    persons: RwLock<Vec<PersonDocument>>,
}

fn upsert<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> Uuid) {
    match items.iter().position(|existing| id(existing) == id(&item)) {
        Some(i) => items[i] = item,
        None => items.push(item),
    }
}

fn paginate<T: Clone>(items: impl IntoIterator<Item = T>, page: Page) -> Vec<T> {
    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(page.size as usize).collect()
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_film(&self, film: FilmDocument) {
        upsert(&mut *self.films.write().await, film, |f| f.id);
    }

    pub async fn insert_genre(&self, genre: GenreDocument) {
        upsert(&mut *self.genres.write().await, genre, |g| g.id);
    }

    pub async fn insert_person(&self, person: PersonDocument) {
        upsert(&mut *self.persons.write().await, person, |p| p.id);
    }

    pub async fn remove_film(&self, id: Uuid) -> bool {
        let mut films = self.films.write().await;
        let before = films.len();
        films.retain(|f| f.id != id);
        films.len() != before
    }

    /// Drops every document, like deleting the indices.
    pub async fn clear(&self) {
        self.films.write().await.clear();
        self.genres.write().await.clear();
        self.persons.write().await.clear();
    }
}

/// Edits tolerated by `fuzziness: AUTO` for a term of this length.
fn auto_fuzziness(term: &str) -> usize {
    match term.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// True when any token of `text` is within the automatic edit distance of `term`.
pub fn fuzzy_matches(text: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    let max_edits = auto_fuzziness(&term);
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .any(|token| levenshtein(&token.to_lowercase(), &term) <= max_edits)
}

fn compare_ratings(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    // missing ratings sort last in either direction
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => a.total_cmp(&b),
            SortDirection::Desc => b.total_cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn credits_person(film: &FilmDocument, person_id: Uuid) -> bool {
    Role::ALL.into_iter().any(|r| film.persons_in(r).iter().any(|p| p.id == person_id))
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn get_film(&self, id: Uuid) -> StoreResult<Option<FilmDocument>> {
        Ok(self.films.read().await.iter().find(|f| f.id == id).cloned())
    }

    async fn get_genre(&self, id: Uuid) -> StoreResult<Option<GenreDocument>> {
        Ok(self.genres.read().await.iter().find(|g| g.id == id).cloned())
    }

    async fn get_person(&self, id: Uuid) -> StoreResult<Option<PersonDocument>> {
        Ok(self.persons.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn list_genres(&self, page: Page) -> StoreResult<Vec<GenreDocument>> {
        Ok(paginate(self.genres.read().await.iter().cloned(), page))
    }

    async fn search_films(&self, query: &FilmQuery) -> StoreResult<Vec<FilmDocument>> {
        let films = self.films.read().await;
        let mut matched: Vec<&FilmDocument> = films
            .iter()
            .filter(|f| match &query.genre {
                Some(genre) => f.genre.iter().any(|g| g.id.to_string() == *genre),
                None => true,
            })
            .filter(|f| match &query.text {
                Some(text) => fuzzy_matches(&f.title, text),
                None => true,
            })
            .collect();
        matched.sort_by(|a, b| compare_ratings(a.imdb_rating, b.imdb_rating, query.sort.direction));
        Ok(paginate(matched.into_iter().cloned(), query.page))
    }

    async fn search_persons(&self, text: &str, page: Page) -> StoreResult<Vec<PersonDocument>> {
        let persons = self.persons.read().await;
        Ok(paginate(persons.iter().filter(|p| fuzzy_matches(&p.name, text)).cloned(), page))
    }

    async fn films_by_person(&self, person_id: Uuid, page: Page) -> StoreResult<Vec<FilmDocument>> {
        let films = self.films.read().await;
        Ok(paginate(films.iter().filter(|f| credits_person(f, person_id)).cloned(), page))
    }

    async fn find_associations(&self, person_id: Uuid) -> StoreResult<PersonAssociations> {
        let mut associations = PersonAssociations::default();
        for film in self.films.read().await.iter() {
            associations.scan(person_id, film);
        }
        Ok(associations)
    }
}
