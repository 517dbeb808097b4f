use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RecipeApiConfig;
use crate::recipes::dto::{
    IngredientSearch, Recipe, RecipeId, RecipeRef, RecipeSearch, SearchResponse,
};

#[derive(Debug, Error)]
pub enum RecipeApiError {
    #[error("recipe {0} not found")]
    NotFound(RecipeId),

    #[error("recipe service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("recipe service request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Read access to the third-party recipe-information service.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    async fn get_recipe(&self, id: &RecipeId) -> Result<Recipe, RecipeApiError>;
    async fn search(&self, search: &RecipeSearch) -> Result<Vec<RecipeRef>, RecipeApiError>;
    async fn search_by_ingredients(
        &self,
        search: &IngredientSearch,
    ) -> Result<Vec<RecipeRef>, RecipeApiError>;
    async fn similar(&self, id: &RecipeId) -> Result<Vec<RecipeRef>, RecipeApiError>;
}

#[derive(Clone)]
pub struct SpoonacularClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl SpoonacularClient {
    pub fn new(cfg: &RecipeApiConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build recipe api http client")?;
        let base_url = Url::parse(&cfg.base_url).context("parse recipe api base url")?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("recipe api base url {base_url} cannot hold a path");
        }
        Ok(Self {
            http,
            base_url,
            api_key: cfg.api_key.clone(),
        })
    }

    /// Appends `segments` to the base path, percent-encoding each one so an
    /// id can never add or climb path levels.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
        id: Option<&RecipeId>,
    ) -> Result<T, RecipeApiError> {
        let response = self
            .http
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;
        Ok(check_status(response, id).await?.json().await?)
    }
}

async fn check_status(response: Response, id: Option<&RecipeId>) -> Result<Response, RecipeApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
        return Err(RecipeApiError::NotFound(id.clone()));
    }
    let message = response.text().await.unwrap_or_default();
    warn!(%status, "recipe api request failed");
    Err(RecipeApiError::Service {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RecipeSource for SpoonacularClient {
    async fn get_recipe(&self, id: &RecipeId) -> Result<Recipe, RecipeApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["recipes", &id_segment, "information"]);
        let params = [("includeNutrition", "true".to_string())];
        let recipe: Recipe = self.get_json(url, &params, Some(id)).await?;
        debug!(recipe_id = %id, ingredients = recipe.ingredients().len(), "recipe fetched");
        Ok(recipe)
    }

    async fn search(&self, search: &RecipeSearch) -> Result<Vec<RecipeRef>, RecipeApiError> {
        let url = self.endpoint(&["recipes", "complexSearch"]);
        let body: SearchResponse = self.get_json(url, &search.to_params(), None).await?;
        debug!(results = body.results.len(), "recipe search done");
        Ok(body.results)
    }

    async fn search_by_ingredients(
        &self,
        search: &IngredientSearch,
    ) -> Result<Vec<RecipeRef>, RecipeApiError> {
        let url = self.endpoint(&["recipes", "findByIngredients"]);
        let results: Vec<RecipeRef> = self.get_json(url, &search.to_params(), None).await?;
        debug!(results = results.len(), "ingredient search done");
        Ok(results)
    }

    async fn similar(&self, id: &RecipeId) -> Result<Vec<RecipeRef>, RecipeApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["recipes", &id_segment, "similar"]);
        let params = [("number", "6".to_string())];
        let results: Vec<RecipeRef> = self.get_json(url, &params, Some(id)).await?;
        debug!(recipe_id = %id, results = results.len(), "similar recipes fetched");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> SpoonacularClient {
        SpoonacularClient::new(&RecipeApiConfig {
            base_url: base_url.into(),
            api_key: "k".into(),
            timeout_secs: 5,
        })
        .expect("client builds")
    }

    #[test]
    fn endpoints_join_onto_the_base_path() {
        let direct = client("https://api.example.test/");
        assert_eq!(
            direct.endpoint(&["recipes", "complexSearch"]).as_str(),
            "https://api.example.test/recipes/complexSearch"
        );

        let proxied = client("https://proxy.example.test/spoon");
        assert_eq!(
            proxied.endpoint(&["recipes", "42", "information"]).as_str(),
            "https://proxy.example.test/spoon/recipes/42/information"
        );
    }

    #[test]
    fn text_ids_stay_inside_one_path_segment() {
        let client = client("https://api.example.test");
        let id = RecipeId::from("../../food/x");
        let id_segment = id.to_string();
        let url = client.endpoint(&["recipes", &id_segment, "information"]);

        assert_eq!(url.host_str(), Some("api.example.test"));
        let segments: Vec<&str> = url.path_segments().expect("has path").collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], "recipes");
        assert_eq!(segments[2], "information");
        assert!(!url.path().contains("/food/"));
    }

    #[test]
    fn base_url_must_hold_a_path() {
        let err = SpoonacularClient::new(&RecipeApiConfig {
            base_url: "mailto:chef@example.test".into(),
            api_key: "k".into(),
            timeout_secs: 5,
        })
        .err()
        .expect("rejected");
        assert!(err.to_string().contains("cannot hold a path"));
    }

    #[test]
    fn errors_render_readably() {
        let err = RecipeApiError::NotFound(RecipeId::Numeric(9));
        assert_eq!(err.to_string(), "recipe 9 not found");

        let err = RecipeApiError::Service {
            status: 402,
            message: "quota exceeded".into(),
        };
        assert!(err.to_string().contains("402"));
    }
}
