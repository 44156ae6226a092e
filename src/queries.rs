//! Static query documents and their typed response shapes.
//!
//! Both documents are immutable, defined once, and reused across
//! invocations. The response shapes deserialize straight out of the
//! service's JSON.

use serde::Deserialize;

use crate::client::GraphQLRequest;

pub const GET_ALL_FILMS: &str = "\
query getAllFilms {
  allFilms {
    films {
      id
      title
    }
  }
}";

pub const GET_ALL_PLANETS: &str = "\
query getAllPlanets {
  allPlanets {
    planets {
      id
      name
    }
  }
}";

/// The films query, ready to execute.
pub fn all_films() -> GraphQLRequest {
    GraphQLRequest::query(GET_ALL_FILMS).operation_name("getAllFilms")
}

/// The planets query, ready to execute.
pub fn all_planets() -> GraphQLRequest {
    GraphQLRequest::query(GET_ALL_PLANETS).operation_name("getAllPlanets")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllFilmsData {
    #[serde(rename = "allFilms")]
    pub all_films: FilmConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilmConnection {
    pub films: Vec<Film>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Film {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllPlanetsData {
    #[serde(rename = "allPlanets")]
    pub all_planets: PlanetConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanetConnection {
    pub planets: Vec<Planet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Planet {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{films_data, planets_data};

    #[test]
    fn test_film_shape_deserializes() {
        let data: AllFilmsData = serde_json::from_value(films_data()).unwrap();
        assert_eq!(data.all_films.films.len(), 3);
        assert_eq!(data.all_films.films[0].id, "ZmlsbXM6MQ==");
        assert_eq!(data.all_films.films[2].title, "Return of the Jedi");
    }

    #[test]
    fn test_planet_shape_deserializes() {
        let data: AllPlanetsData = serde_json::from_value(planets_data()).unwrap();
        assert_eq!(data.all_planets.planets.len(), 2);
        assert_eq!(data.all_planets.planets[1].name, "Alderaan");
    }

    #[test]
    fn test_documents_are_named() {
        assert_eq!(all_films().operation_name.as_deref(), Some("getAllFilms"));
        assert_eq!(
            all_planets().operation_name.as_deref(),
            Some("getAllPlanets")
        );
        assert!(GET_ALL_FILMS.contains("allFilms"));
        assert!(GET_ALL_PLANETS.contains("allPlanets"));
    }
}
