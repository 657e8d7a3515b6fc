use crate::config::ExperienceConfig;

/// The view a path leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Scene(usize),
    NotFound(String),
}

impl Route {
    pub fn resolve(path: &str, config: &ExperienceConfig) -> Route {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        if normalized == "/" {
            return Route::Home;
        }

        // Paths without a leading slash still resolve, as typed on a command line.
        let with_slash = if normalized.starts_with('/') {
            normalized.to_string()
        } else {
            format!("/{normalized}")
        };

        match config.scene_index(&with_slash) {
            Some(index) => Route::Scene(index),
            None => Route::NotFound(with_slash),
        }
    }

    pub fn path(&self, config: &ExperienceConfig) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Scene(index) => config
                .scenes
                .get(*index)
                .map(|s| s.route.clone())
                .unwrap_or_else(|| format!("/scene/{index}")),
            Route::NotFound(path) => path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_home_and_scenes() {
        let config = ExperienceConfig::builtin();
        assert_eq!(Route::resolve("/", &config), Route::Home);
        assert_eq!(Route::resolve("", &config), Route::Home);
        assert_eq!(Route::resolve("/forestVeda/Scene1", &config), Route::Scene(0));
        assert_eq!(Route::resolve("/forestVeda/Scene3/", &config), Route::Scene(2));
        assert_eq!(Route::resolve("forestVeda/Scene2", &config), Route::Scene(1));
    }

    #[test]
    fn everything_else_is_not_found() {
        let config = ExperienceConfig::builtin();
        assert_eq!(
            Route::resolve("/seaVeda", &config),
            Route::NotFound("/seaVeda".to_string())
        );
    }

    #[test]
    fn path_round_trips_scene_routes() {
        let config = ExperienceConfig::builtin();
        assert_eq!(Route::Scene(1).path(&config), "/forestVeda/Scene2");
        assert_eq!(Route::Home.path(&config), "/");
    }
}
