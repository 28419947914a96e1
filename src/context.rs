use crate::api::LetterClient;
use crate::config::{self, AppPaths, Settings};
use crate::error::AppResult;
use crate::facade::{FacadeConfig, LetterFacade};
use crate::output::Output;

#[derive(Debug)]
pub struct AppContext {
    pub profile: String,
    pub paths: AppPaths,
    pub settings: Settings,
    pub letters: LetterFacade<LetterClient>,
    pub output: Output,
}

impl AppContext {
    pub fn bootstrap(profile: String, json: bool, base_url: Option<String>) -> AppResult<Self> {
        let profile = config::resolve_profile(&profile)?;
        let paths = AppPaths::discover()?;
        let settings = config::load_settings(&paths, &profile)?.with_base_url(base_url);
        let client = LetterClient::from_settings(&settings)?;
        let letters = LetterFacade::new(client, FacadeConfig::from_settings(&settings));
        let output = Output::new(json);

        Ok(Self {
            profile,
            paths,
            settings,
            letters,
            output,
        })
    }
}
