use cached::proc_macro::cached;
use config::{Config, File, FileFormat};
use futures_locks::RwLock;
use once_cell::sync::Lazy;
use serde::Deserialize;

static CONFIG_BUILDER: Lazy<RwLock<Config>> = Lazy::new(|| {
    RwLock::new({
        let mut builder = Config::builder().add_source(File::from_str(
            include_str!("../Tally.toml"),
            FileFormat::Toml,
        ));

        if std::path::Path::new("Tally.toml").exists() {
            builder = builder.add_source(File::new("Tally.toml", FileFormat::Toml));
        }

        builder.build().unwrap()
    })
});

#[derive(Deserialize, Debug, Clone)]
pub struct Database {
    pub mongodb: String,
    pub redis: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Hosts {
    pub app: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiSummarization {
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiWorkers {
    pub max_concurrent_connections: usize,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Api {
    pub summarization: ApiSummarization,
    pub workers: ApiWorkers,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FeaturesLimits {
    pub events: usize,
    pub collaborators: usize,
    pub line_items: usize,
    pub name_length: usize,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Features {
    pub limits: FeaturesLimits,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub database: Database,
    pub hosts: Hosts,
    pub api: Api,
    pub features: Features,
}

pub async fn read() -> Config {
    CONFIG_BUILDER.read().await.clone()
}

#[cached(time = 30)]
pub async fn config() -> Settings {
    read().await.try_deserialize::<Settings>().unwrap()
}

#[cfg(test)]
mod tests {
    use crate::config;

    #[async_std::test]
    async fn it_works() {
        let settings = config().await;
        assert!(settings.features.limits.collaborators > 0);
    }
}
