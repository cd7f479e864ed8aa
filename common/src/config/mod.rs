pub mod aws_client_config;

use serde::de::DeserializeOwned;
use strum::IntoEnumIterator;
use strum::{Display, EnumIter};

#[derive(Clone, Eq, PartialEq, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    Local,
    Development,
    QA,
    Staging,
    Production,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the default configuration for the project. This is the
    /// configuration used in production.
    ///
    /// This will load the following files, in order:
    /// - OS environment variables
    /// - `.env.development` then `.env.development.local`
    /// - `.env.qa` then `.env.qa.local`
    /// - `.env.staging` then `.env.staging.local`
    /// - `.env.production` then `.env.production.local`
    /// - `.env.local`
    /// - `.env`
    ///
    /// Variables are not overriden, the first file to contain
    /// a definition for a variable is the one that will be set.
    ///
    /// If a variable is set in the OS environment, it will not be
    /// overriden by any file.
    pub fn load_default<TConfig>() -> Result<TConfig, envy::Error>
    where
        TConfig: DeserializeOwned,
    {
        for environment in Environment::iter() {
            if environment != Environment::Local {
                dotenv::from_filename(format!(".env.{}.local", environment)).ok();
                dotenv::from_filename(format!(".env.{}", environment)).ok();
            }
        }

        ConfigLoader::load::<TConfig>()
    }

    fn load<TConfig>() -> Result<TConfig, envy::Error>
    where
        TConfig: DeserializeOwned,
    {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env").ok();

        envy::from_env::<TConfig>()
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;
    use strum::IntoEnumIterator;

    #[test]
    fn environments_render_as_dotenv_suffixes() {
        let suffixes: Vec<String> = Environment::iter().map(|e| e.to_string()).collect();

        assert_eq!(
            vec!["local", "development", "qa", "staging", "production"],
            suffixes
        );
    }
}
