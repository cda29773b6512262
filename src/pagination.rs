use serde::Deserialize;

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Normalized page: both fields are always at least 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    /// Absent or non-positive values fall back to the defaults.
    pub fn normalize(number: Option<i64>, size: Option<i64>) -> Self {
        Self {
            number: positive_or(number, DEFAULT_PAGE_NUMBER),
            size: positive_or(size, DEFAULT_PAGE_SIZE),
        }
    }

    pub fn offset(self) -> u64 {
        u64::from(self.size) * u64::from(self.number - 1)
    }

    pub fn limit(self) -> u64 {
        u64::from(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { number: DEFAULT_PAGE_NUMBER, size: DEFAULT_PAGE_SIZE }
    }
}

fn positive_or(value: Option<i64>, default: u32) -> u32 {
    match value {
        Some(v) if v >= 1 => u32::try_from(v).unwrap_or(u32::MAX),
        _ => default,
    }
}

/// `page[number]` / `page[size]` as they arrive on the query string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(rename = "page[number]")]
    pub number: Option<i64>,
    #[serde(rename = "page[size]")]
    pub size: Option<i64>,
}

impl PageParams {
    /// Rejects values below the endpoint's lower bound before normalizing.
    pub fn validate(&self, min_number: i64) -> Result<Page, String> {
        if let Some(n) = self.number {
            if n < min_number {
                return Err(format!("page[number] must be greater than or equal to {min_number}"));
            }
        }
        if let Some(s) = self.size {
            if s < 1 {
                return Err("page[size] must be greater than or equal to 1".to_string());
            }
        }
        Ok(Page::normalize(self.number, self.size))
    }
}

/// Film listing parameters: paging plus the genre filter and sort token.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FilmParams {
    #[serde(rename = "page[number]")]
    pub number: Option<i64>,
    #[serde(rename = "page[size]")]
    pub size: Option<i64>,
    #[serde(rename = "filter[genre]")]
    pub genre: Option<String>,
    pub sort: Option<String>,
    pub query: Option<String>,
}

impl FilmParams {
    pub fn page_params(&self) -> PageParams {
        PageParams { number: self.number, size: self.size }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "page[number]")]
    pub number: Option<i64>,
    #[serde(rename = "page[size]")]
    pub size: Option<i64>,
    #[serde(default)]
    pub query: String,
}

impl SearchParams {
    pub fn page_params(&self) -> PageParams {
        PageParams { number: self.number, size: self.size }
    }
}
