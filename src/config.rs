use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct RecipeApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub recipe_api: RecipeApiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow::anyhow!("missing environment variable {key}"))
        };

        let database_url = required("DATABASE_URL")?;
        let server = ServerConfig {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: match lookup("APP_PORT") {
                Some(port) => port
                    .parse()
                    .with_context(|| format!("APP_PORT {port:?} is not a port number"))?,
                None => 8080,
            },
        };
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "mealplanner".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "mealplanner-users".into()),
        };
        let recipe_api = RecipeApiConfig {
            base_url: lookup("RECIPE_API_BASE_URL")
                .unwrap_or_else(|| "https://api.spoonacular.com".into()),
            api_key: required("RECIPE_API_KEY")?,
            timeout_secs: lookup("RECIPE_API_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(15),
        };
        Ok(Self {
            database_url,
            server,
            jwt,
            recipe_api,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_values() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/plans"),
            ("JWT_SECRET", "s3cret"),
            ("RECIPE_API_KEY", "key"),
        ]))
        .expect("config should load");

        assert_eq!(cfg.server.listen_addr(), ("0.0.0.0", 8080));
        assert_eq!(cfg.jwt.issuer, "mealplanner");
        assert_eq!(cfg.jwt.audience, "mealplanner-users");
        assert_eq!(cfg.recipe_api.base_url, "https://api.spoonacular.com");
        assert_eq!(cfg.recipe_api.timeout_secs, 15);
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/plans"),
            ("JWT_SECRET", "s3cret"),
            ("RECIPE_API_KEY", "key"),
            ("RECIPE_API_TIMEOUT_SECS", "soon"),
        ]))
        .expect("config should load");
        assert_eq!(cfg.recipe_api.timeout_secs, 15);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/plans"),
            ("JWT_SECRET", "s3cret"),
            ("RECIPE_API_KEY", "key"),
            ("APP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/plans"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("RECIPE_API_KEY"));
    }
}
