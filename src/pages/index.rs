//! The index page: films and planets from the Star Wars service.

use async_trait::async_trait;

use crate::app::{Page, PageContext, PageProps};
use crate::queries::{self, AllFilmsData, AllPlanetsData};
use crate::render::{html, Component, Html, QueryHook, RenderContext};
use crate::Result;

/// Renders two lists backed by two separate queries. Only the films query
/// is prefetched; the planets query is first issued here during render,
/// which is what the fixed-point render pass exists to pick up.
pub struct IndexPage;

impl Component for IndexPage {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<Html> {
        let films: QueryHook<AllFilmsData> = ctx.use_query(queries::all_films());
        let planets: QueryHook<AllPlanetsData> = ctx.use_query(queries::all_planets());

        match (films.data, planets.data) {
            (Some(films), Some(planets)) => {
                let mut out = String::from("<h2>Films</h2>");
                out.push_str(&html::unordered_list(
                    films.all_films.films.iter().map(|f| f.title.as_str()),
                ));
                out.push_str("<h2>Planets</h2>");
                out.push_str(&html::unordered_list(
                    planets.all_planets.planets.iter().map(|p| p.name.as_str()),
                ));
                Ok(out)
            }
            _ => Ok(Html::new()),
        }
    }
}

#[async_trait]
impl Page for IndexPage {
    async fn get_initial_props(&self, ctx: &mut PageContext) -> Result<PageProps> {
        // Warm the cache ahead of render. The result is not passed through
        // props; the same query inside the tree reuses the cached entry.
        ctx.client().query(&queries::all_films()).await;
        Ok(PageProps::new())
    }
}
